// Per-request timezone.
//
// A `timezone` cookie, set through `POST /set-timezone`, takes precedence
// over a `tz` request header, which takes precedence over the configured
// default. Unparseable values are ignored.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, request::Parts},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::shared::core::primitives::Timezone;
use crate::shell::state::AppState;

pub const TIMEZONE_COOKIE: &str = "timezone";
pub const TIMEZONE_HEADER: &str = "tz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimezone {
    pub timezone: Timezone,
    /// Whether the reader picked the timezone through the cookie.
    pub chosen: bool,
}

impl RequestTimezone {
    pub fn resolve(headers: &HeaderMap, default: Timezone) -> Self {
        if let Some(timezone) = cookie_timezone(headers) {
            return Self {
                timezone,
                chosen: true,
            };
        }
        let from_header = headers
            .get(TIMEZONE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());
        Self {
            timezone: from_header.unwrap_or(default),
            chosen: false,
        }
    }
}

fn cookie_timezone(headers: &HeaderMap) -> Option<Timezone> {
    CookieJar::from_headers(headers)
        .get(TIMEZONE_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

impl<S> FromRequestParts<S> for RequestTimezone
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        Ok(Self::resolve(&parts.headers, app.default_timezone))
    }
}

#[derive(Deserialize)]
pub struct SetTimezoneBody {
    pub timezone: Timezone,
}

#[derive(Serialize)]
pub struct SetTimezoneResponse {
    pub timezone: Timezone,
}

pub async fn set_timezone(
    jar: CookieJar,
    body: Result<Json<SetTimezoneBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let cookie = Cookie::build((TIMEZONE_COOKIE, body.timezone.to_string()))
        .path("/")
        .same_site(SameSite::Lax);
    (
        jar.add(cookie),
        Json(SetTimezoneResponse {
            timezone: body.timezone,
        }),
    )
        .into_response()
}
