// src/db/report_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::report::{Report, ReportSourceRow},
};

const REPORT_COLUMNS: &str = "id, period_id, report_type, data, generated_by, generated_at";

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    pub async fn list(&self, period_id: Option<Uuid>) -> Result<Vec<Report>, AppError> {
        let sql = format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE ($1::uuid IS NULL OR period_id = $1)
            ORDER BY generated_at DESC
            "#
        );
        let reports = sqlx::query_as::<_, Report>(&sql)
            .bind(period_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reports)
    }

    /// Forecasts do período com seus projetos (LEFT JOIN: forecast sem projeto também conta).
    pub async fn source_rows(&self, period_id: Uuid) -> Result<Vec<ReportSourceRow>, AppError> {
        let rows = sqlx::query_as::<_, ReportSourceRow>(
            r#"
            SELECT
                f.id AS forecast_id,
                f.market_segment,
                f.status AS forecast_status,
                p.project_type,
                p.estimated_value,
                p.probability
            FROM forecasts f
            LEFT JOIN projects p ON p.forecast_id = f.id
            WHERE f.period_id = $1
            "#,
        )
        .bind(period_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        period_id: Uuid,
        report_type: &str,
        data: &Value,
        generated_by: Uuid,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO reports (period_id, report_type, data, generated_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(period_id)
            .bind(report_type)
            .bind(data)
            .bind(generated_by)
            .fetch_one(executor)
            .await?;
        Ok(report)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
