// src/db/project_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::project::{CreateProjectPayload, Project, ProjectAllocation, UpdateProjectPayload},
};

const PROJECT_COLUMNS: &str = r#"
    id, forecast_id, name, project_type, estimated_value, probability,
    expected_close_date, start_date, client_name, description, notes,
    created_at, updated_at
"#;

const ALLOCATION_COLUMNS: &str = "id, project_id, month, amount, updated_at";

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// Lista projetos, opcionalmente de um forecast e/ou de um dono.
    pub async fn list(
        &self,
        forecast_id: Option<Uuid>,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            r#"
            SELECT {columns} FROM projects p
            JOIN forecasts f ON f.id = p.forecast_id
            WHERE ($1::uuid IS NULL OR p.forecast_id = $1)
              AND ($2::uuid IS NULL OR f.user_id = $2)
            ORDER BY p.expected_close_date, p.name
            "#,
            columns = prefixed_project_columns()
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(forecast_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateProjectPayload,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO projects (
                forecast_id, name, project_type, estimated_value, probability,
                expected_close_date, start_date, client_name, description, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PROJECT_COLUMNS}
            "#
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(input.forecast_id)
            .bind(&input.name)
            .bind(input.project_type)
            .bind(input.estimated_value)
            .bind(input.probability)
            .bind(input.expected_close_date)
            .bind(input.start_date)
            .bind(&input.client_name)
            .bind(&input.description)
            .bind(&input.notes)
            .fetch_one(executor)
            .await?;
        Ok(project)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateProjectPayload,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                project_type = COALESCE($3, project_type),
                estimated_value = COALESCE($4, estimated_value),
                probability = COALESCE($5, probability),
                expected_close_date = COALESCE($6, expected_close_date),
                start_date = COALESCE($7, start_date),
                client_name = COALESCE($8, client_name),
                description = COALESCE($9, description),
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.project_type)
            .bind(input.estimated_value)
            .bind(input.probability)
            .bind(input.expected_close_date)
            .bind(input.start_date)
            .bind(&input.client_name)
            .bind(&input.description)
            .bind(&input.notes)
            .fetch_optional(executor)
            .await?;
        Ok(project)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ALOCAÇÕES MENSAIS
    // =========================================================================

    pub async fn list_allocations<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<ProjectAllocation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ALLOCATION_COLUMNS} FROM project_allocations WHERE project_id = $1 ORDER BY month"
        );
        let allocations = sqlx::query_as::<_, ProjectAllocation>(&sql)
            .bind(project_id)
            .fetch_all(executor)
            .await?;
        Ok(allocations)
    }

    pub async fn upsert_allocation<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        month: NaiveDate,
        amount: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO project_allocations (project_id, month, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, month)
            DO UPDATE SET amount = EXCLUDED.amount, updated_at = NOW()
            "#,
        )
        .bind(project_id)
        .bind(month)
        .bind(amount)
        .execute(executor)
        .await?;
        Ok(())
    }
}

fn prefixed_project_columns() -> String {
    PROJECT_COLUMNS
        .split(',')
        .map(|c| format!("p.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_columns_are_prefixed_for_joins() {
        let cols = prefixed_project_columns();
        assert!(cols.starts_with("p.id, p.forecast_id"));
        assert!(cols.ends_with("p.updated_at"));
        assert!(!cols.contains('\n'));
    }
}
