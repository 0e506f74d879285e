// src/db/period_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::period::{ForecastPeriod, PeriodStatus},
};

const PERIOD_COLUMNS: &str = r#"
    id, name, start_date, end_date, submission_deadline, status, is_locked,
    created_at, updated_at
"#;

#[derive(Debug, Default)]
pub struct PeriodChanges {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub submission_deadline: Option<NaiveDate>,
    pub status: Option<PeriodStatus>,
}

#[derive(Clone)]
pub struct PeriodRepository {
    pool: PgPool,
}

impl PeriodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ForecastPeriod>, AppError> {
        let sql = format!("SELECT {PERIOD_COLUMNS} FROM forecast_periods WHERE id = $1");
        let period = sqlx::query_as::<_, ForecastPeriod>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(period)
    }

    pub async fn list(&self) -> Result<Vec<ForecastPeriod>, AppError> {
        let sql = format!("SELECT {PERIOD_COLUMNS} FROM forecast_periods ORDER BY start_date DESC");
        let periods = sqlx::query_as::<_, ForecastPeriod>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(periods)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        submission_deadline: NaiveDate,
        status: PeriodStatus,
    ) -> Result<ForecastPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO forecast_periods (name, start_date, end_date, submission_deadline, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PERIOD_COLUMNS}
            "#
        );
        let period = sqlx::query_as::<_, ForecastPeriod>(&sql)
            .bind(name)
            .bind(start_date)
            .bind(end_date)
            .bind(submission_deadline)
            .bind(status)
            .fetch_one(executor)
            .await?;
        Ok(period)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: PeriodChanges,
    ) -> Result<Option<ForecastPeriod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE forecast_periods SET
                name = COALESCE($2, name),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                submission_deadline = COALESCE($5, submission_deadline),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PERIOD_COLUMNS}
            "#
        );
        let period = sqlx::query_as::<_, ForecastPeriod>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.start_date)
            .bind(changes.end_date)
            .bind(changes.submission_deadline)
            .bind(changes.status)
            .fetch_optional(executor)
            .await?;
        Ok(period)
    }

    pub async fn set_locked<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        locked: bool,
    ) -> Result<Option<ForecastPeriod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE forecast_periods SET is_locked = $2, updated_at = NOW() WHERE id = $1 RETURNING {PERIOD_COLUMNS}"
        );
        let period = sqlx::query_as::<_, ForecastPeriod>(&sql)
            .bind(id)
            .bind(locked)
            .fetch_optional(executor)
            .await?;
        Ok(period)
    }

    /// Remove o período; forecasts, projetos e relatórios caem em cascata.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM forecast_periods WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
