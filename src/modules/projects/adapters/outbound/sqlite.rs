// SQLite implementation of the project and charge repositories.
//
// Ids are stored as hyphenated UUID text and instants as microseconds since
// the Unix epoch, so time charged is plain integer arithmetic in SQL. The
// schema carries the same charge invariants as CHECK constraints.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::modules::projects::core::aggregation::ProjectTotal;
use crate::modules::projects::core::charge::{Charge, ChargeDraft, ChargeId};
use crate::modules::projects::core::filters::{ChargeFilter, ProjectFilter};
use crate::modules::projects::core::ports::{
    ChargeRecord, ChargeRepository, ProjectRecord, ProjectRepository, StoreError,
};
use crate::modules::projects::core::project::{Project, ProjectDraft, ProjectId};
use crate::modules::projects::core::validation::{
    ChargeContext, Field, ProjectContext, Validate,
};
use crate::shared::core::primitives::TimeRange;

/// Projects annotated with the end of their latest charge.
const PROJECT_SELECT: &str = "SELECT p.id, p.name, p.active, \
    (SELECT MAX(c.end_time) FROM charges c WHERE c.project_id = p.id) AS latest_charge \
    FROM projects p";

/// Charges annotated with their project's name and the time they charged.
const CHARGE_SELECT: &str = "SELECT c.id, c.project_id, c.start_time, c.end_time, c.closed, \
    p.name AS project_name, COALESCE(c.end_time - c.start_time, 0) AS time_charged \
    FROM charges c JOIN projects p ON p.id = c.project_id";

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    active: bool,
    latest_charge: Option<i64>,
}

impl ProjectRow {
    fn into_record(self) -> Result<ProjectRecord, StoreError> {
        Ok(ProjectRecord {
            project: Project {
                id: parse_id(&self.id)?,
                name: self.name,
                active: self.active,
            },
            latest_charge: self.latest_charge.map(from_micros).transpose()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChargeRow {
    id: String,
    project_id: String,
    start_time: i64,
    end_time: Option<i64>,
    closed: bool,
    project_name: String,
    time_charged: i64,
}

impl ChargeRow {
    fn into_record(self) -> Result<ChargeRecord, StoreError> {
        Ok(ChargeRecord {
            charge: Charge {
                id: parse_id(&self.id)?,
                project_id: parse_id(&self.project_id)?,
                start_time: from_micros(self.start_time)?,
                end_time: self.end_time.map(from_micros).transpose()?,
                closed: self.closed,
            },
            project_name: self.project_name,
            time_charged: TimeDelta::microseconds(self.time_charged),
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProjectTotalRow {
    project_id: String,
    project_name: String,
    total: i64,
}

fn parse_id<T: FromStr>(value: &str) -> Result<T, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::Backend(format!("malformed id `{value}`")))
}

fn from_micros(value: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(value)
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {value}")))
}

fn store_error(error: sqlx::Error) -> StoreError {
    if let Some(database_error) = error.as_database_error() {
        if database_error.is_unique_violation()
            || database_error.is_check_violation()
            || database_error.is_foreign_key_violation()
        {
            return StoreError::ConstraintViolation(database_error.message().to_string());
        }
    }
    StoreError::Backend(error.to_string())
}

fn push_project_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &ProjectFilter) {
    query.push(" WHERE 1 = 1");
    if let Some(needle) = &filter.name_contains {
        query
            .push(" AND instr(lower(p.name), lower(")
            .push_bind(needle.clone())
            .push(")) > 0");
    }
    if let Some(active) = filter.active {
        query.push(" AND p.active = ").push_bind(active);
    }
}

fn push_charge_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &ChargeFilter) {
    query.push(" WHERE 1 = 1");
    if let Some(project_id) = filter.project_id {
        query
            .push(" AND c.project_id = ")
            .push_bind(project_id.to_string());
    }
    if let Some(name) = &filter.project_name {
        query.push(" AND p.name = ").push_bind(name.clone());
    }
    if let Some(needle) = &filter.project_name_contains {
        query
            .push(" AND instr(lower(p.name), lower(")
            .push_bind(needle.clone())
            .push(")) > 0");
    }
    if let Some(range) = filter.started_within {
        push_range(query, "c.start_time", range);
    }
    if let Some(range) = filter.ended_within {
        push_range(query, "c.end_time", range);
    }
    if let Some(closed) = filter.closed {
        query.push(" AND c.closed = ").push_bind(closed);
    }
}

fn push_range(query: &mut QueryBuilder<'_, Sqlite>, column: &str, range: TimeRange) {
    query
        .push(format!(" AND {column} >= "))
        .push_bind(range.start.timestamp_micros())
        .push(format!(" AND {column} < "))
        .push_bind(range.end.timestamp_micros());
}

#[derive(Clone)]
pub struct SqliteProjectTimeStore {
    pool: SqlitePool,
}

impl SqliteProjectTimeStore {
    /// Open (creating if needed) the database at `url` and apply migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(store_error)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(store_error)?;
        Self::migrated(pool).await
    }

    /// A private in-memory database. The pool keeps its single connection
    /// open, since the database disappears with it.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(store_error)?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(store_error)?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn fetch_project<'e, E>(executor: E, id: ProjectId) -> Result<Option<Project>, StoreError>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let query = format!("{PROJECT_SELECT} WHERE p.id = ?");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id.to_string())
            .fetch_optional(executor)
            .await
            .map_err(store_error)?
            .map(|row| row.into_record().map(|record| record.project))
            .transpose()
    }

    async fn fetch_charge<'e, E>(executor: E, id: ChargeId) -> Result<Option<Charge>, StoreError>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let query = format!("{CHARGE_SELECT} WHERE c.id = ?");
        sqlx::query_as::<_, ChargeRow>(&query)
            .bind(id.to_string())
            .fetch_optional(executor)
            .await
            .map_err(store_error)?
            .map(|row| row.into_record().map(|record| record.charge))
            .transpose()
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectTimeStore {
    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Self::fetch_project(&self.pool, id).await
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, StoreError> {
        let query = format!("{PROJECT_SELECT} WHERE p.name = ?");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?
            .map(|row| row.into_record().map(|record| record.project))
            .transpose()
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectRecord>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(PROJECT_SELECT);
        push_project_filter(&mut query, filter);
        query.push(" ORDER BY p.name");
        query
            .build_query_as::<ProjectRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(ProjectRow::into_record)
            .collect()
    }

    async fn save_project(
        &self,
        draft: ProjectDraft,
        exclude: &BTreeSet<Field>,
    ) -> Result<Project, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let previous = match draft.id {
            Some(id) => Self::fetch_project(&mut *tx, id).await?,
            None => None,
        };
        let same_name: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE name = ? AND id <> ?")
                .bind(&draft.name)
                .bind(draft.id.map(|id| id.to_string()).unwrap_or_default())
                .fetch_one(&mut *tx)
                .await
                .map_err(store_error)?;
        let context = ProjectContext {
            previous: previous.as_ref(),
            name_taken: same_name > 0,
        };
        draft.validate(&context, exclude)?;

        let project = draft.into_project();
        sqlx::query(
            "INSERT INTO projects (id, name, active) VALUES (?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = excluded.name, active = excluded.active",
        )
        .bind(project.id.to_string())
        .bind(&project.name)
        .bind(project.active)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(project_id = %project.id, "project saved");
        Ok(project)
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let references: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM charges WHERE project_id = ?")
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error)?;
        if references > 0 {
            return Err(StoreError::ProtectedReference {
                entity: "project",
                key: id.to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|error| match store_error(error) {
                StoreError::ConstraintViolation(_) => StoreError::ProtectedReference {
                    entity: "project",
                    key: id.to_string(),
                },
                other => other,
            })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "project",
                key: id.to_string(),
            });
        }

        tx.commit().await.map_err(store_error)
    }
}

#[async_trait]
impl ChargeRepository for SqliteProjectTimeStore {
    async fn get_charge(&self, id: ChargeId) -> Result<Option<Charge>, StoreError> {
        Self::fetch_charge(&self.pool, id).await
    }

    async fn latest_open_charge(&self) -> Result<Option<Charge>, StoreError> {
        let query =
            format!("{CHARGE_SELECT} WHERE c.closed = 0 ORDER BY c.start_time DESC, c.id DESC LIMIT 1");
        sqlx::query_as::<_, ChargeRow>(&query)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?
            .map(|row| row.into_record().map(|record| record.charge))
            .transpose()
    }

    async fn list_charges(&self, filter: &ChargeFilter) -> Result<Vec<ChargeRecord>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(CHARGE_SELECT);
        push_charge_filter(&mut query, filter);
        query.push(" ORDER BY c.start_time, c.id");
        query
            .build_query_as::<ChargeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(ChargeRow::into_record)
            .collect()
    }

    async fn save_charge(
        &self,
        draft: ChargeDraft,
        exclude: &BTreeSet<Field>,
    ) -> Result<Charge, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let project = Self::fetch_project(&mut *tx, draft.project_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "project",
                key: draft.project_id.to_string(),
            })?;
        let previous = match draft.id {
            Some(id) => Self::fetch_charge(&mut *tx, id).await?,
            None => None,
        };
        let context = ChargeContext {
            project: &project,
            previous: previous.as_ref(),
        };
        draft.validate(&context, exclude)?;

        let charge = draft.into_charge();
        sqlx::query(
            "INSERT INTO charges (id, project_id, start_time, end_time, closed) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET project_id = excluded.project_id, \
             start_time = excluded.start_time, end_time = excluded.end_time, \
             closed = excluded.closed",
        )
        .bind(charge.id.to_string())
        .bind(charge.project_id.to_string())
        .bind(charge.start_time.timestamp_micros())
        .bind(charge.end_time.map(|end_time| end_time.timestamp_micros()))
        .bind(charge.closed)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(charge_id = %charge.id, "charge saved");
        Ok(charge)
    }

    async fn delete_charge(&self, id: ChargeId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM charges WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "charge",
                key: id.to_string(),
            });
        }
        Ok(())
    }

    async fn bulk_insert_charges(&self, charges: &[Charge]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        for charge in charges {
            sqlx::query(
                "INSERT INTO charges (id, project_id, start_time, end_time, closed) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(charge.id.to_string())
            .bind(charge.project_id.to_string())
            .bind(charge.start_time.timestamp_micros())
            .bind(charge.end_time.map(|end_time| end_time.timestamp_micros()))
            .bind(charge.closed)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        }
        tx.commit().await.map_err(store_error)
    }

    async fn aggregate_time_charged(&self, filter: &ChargeFilter) -> Result<TimeDelta, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT COALESCE(SUM(c.end_time - c.start_time), 0) \
             FROM charges c JOIN projects p ON p.id = c.project_id",
        );
        push_charge_filter(&mut query, filter);
        let micros: i64 = query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(TimeDelta::microseconds(micros))
    }

    async fn monthly_totals(
        &self,
        month: TimeRange,
        project_ids: &[ProjectId],
    ) -> Result<Vec<ProjectTotal>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT p.id AS project_id, p.name AS project_name, \
             SUM(c.end_time - c.start_time) AS total \
             FROM charges c JOIN projects p ON p.id = c.project_id \
             WHERE c.end_time IS NOT NULL",
        );
        push_range(&mut query, "c.start_time", month);
        if !project_ids.is_empty() {
            query.push(" AND c.project_id IN (");
            let mut ids = query.separated(", ");
            for id in project_ids {
                ids.push_bind(id.to_string());
            }
            ids.push_unseparated(")");
        }
        query.push(" GROUP BY p.id, p.name ORDER BY p.id");

        query
            .build_query_as::<ProjectTotalRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|row| {
                Ok(ProjectTotal {
                    project_id: parse_id(&row.project_id)?,
                    project_name: row.project_name,
                    total: TimeDelta::microseconds(row.total),
                })
            })
            .collect()
    }
}
