// src/db/forecast_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        forecast::{Forecast, ForecastFilter, ForecastStatus},
        user::MarketSegment,
    },
};

const FORECAST_COLUMNS: &str = r#"
    id, user_id, period_id, market_segment, status, submitted_at, approved_at,
    rejected_at, rejection_reason, created_at, updated_at
"#;

#[derive(Clone)]
pub struct ForecastRepository {
    pool: PgPool,
}

impl ForecastRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Forecast>, AppError> {
        let sql = format!("SELECT {FORECAST_COLUMNS} FROM forecasts WHERE id = $1");
        let forecast = sqlx::query_as::<_, Forecast>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(forecast)
    }

    // Filtros opcionais: parâmetro nulo desliga o filtro
    pub async fn list(&self, filter: &ForecastFilter) -> Result<Vec<Forecast>, AppError> {
        let sql = format!(
            r#"
            SELECT {FORECAST_COLUMNS} FROM forecasts
            WHERE ($1::uuid IS NULL OR period_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::forecast_status IS NULL OR status = $3)
              AND ($4::market_segment IS NULL OR market_segment = $4)
            ORDER BY created_at DESC
            "#
        );
        let forecasts = sqlx::query_as::<_, Forecast>(&sql)
            .bind(filter.period_id)
            .bind(filter.user_id)
            .bind(filter.status)
            .bind(filter.market_segment)
            .fetch_all(&self.pool)
            .await?;
        Ok(forecasts)
    }

    // A UNIQUE (user, period, segment) transforma duplicatas em DUPLICATE_FIELD
    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        period_id: Uuid,
        market_segment: MarketSegment,
    ) -> Result<Forecast, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO forecasts (user_id, period_id, market_segment)
            VALUES ($1, $2, $3)
            RETURNING {FORECAST_COLUMNS}
            "#
        );
        let forecast = sqlx::query_as::<_, Forecast>(&sql)
            .bind(user_id)
            .bind(period_id)
            .bind(market_segment)
            .fetch_one(executor)
            .await?;
        Ok(forecast)
    }

    /// Aplica uma transição de status carimbando o horário correspondente.
    /// O `WHERE status = $3` garante que ninguém mudou o status no meio do caminho.
    pub async fn transition<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: ForecastStatus,
        to: ForecastStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Forecast>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE forecasts SET
                status = $2,
                submitted_at = CASE WHEN $2 = 'SUBMITTED'::forecast_status THEN NOW() ELSE submitted_at END,
                approved_at = CASE WHEN $2 = 'APPROVED'::forecast_status THEN NOW() ELSE approved_at END,
                rejected_at = CASE WHEN $2 = 'REJECTED'::forecast_status THEN NOW() ELSE rejected_at END,
                rejection_reason = CASE
                    WHEN $2 = 'REJECTED'::forecast_status THEN $4
                    WHEN $2 = 'SUBMITTED'::forecast_status THEN NULL
                    ELSE rejection_reason
                END,
                updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING {FORECAST_COLUMNS}
            "#
        );
        let forecast = sqlx::query_as::<_, Forecast>(&sql)
            .bind(id)
            .bind(to)
            .bind(from)
            .bind(rejection_reason)
            .fetch_optional(executor)
            .await?;
        Ok(forecast)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM forecasts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
