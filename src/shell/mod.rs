// Composition root: configuration, store selection and the HTTP, GraphQL
// and command-line surfaces over the shared application state.

pub mod cli;
pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
pub mod timezone;
