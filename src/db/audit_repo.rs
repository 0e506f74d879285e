// src/db/audit_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::audit::{AuditContext, AuditFilter, AuditLog, NewAuditLog},
};

const AUDIT_COLUMNS: &str = r#"
    id, user_id, action, resource_type, resource_id, old_values, new_values,
    ip_address, user_agent, created_at
"#;

// Trilha de auditoria: só INSERT e SELECT
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record<'e, E>(
        &self,
        executor: E,
        ctx: &AuditContext,
        entry: NewAuditLog,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                user_id, action, resource_type, resource_id,
                old_values, new_values, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(ctx.user_id)
        .bind(entry.action)
        .bind(entry.resource_type)
        .bind(entry.resource_id)
        .bind(entry.old_values)
        .bind(entry.new_values)
        .bind(&ctx.ip_address)
        .bind(&ctx.user_agent)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, AppError> {
        let sql = format!(
            r#"
            SELECT {AUDIT_COLUMNS} FROM audit_logs
            WHERE ($1::text IS NULL OR resource_type = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#
        );
        let logs = sqlx::query_as::<_, AuditLog>(&sql)
            .bind(&filter.resource_type)
            .bind(filter.user_id)
            .bind(filter.effective_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }
}
