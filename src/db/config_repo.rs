// src/db/config_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::system_config::SystemConfig};

const CONFIG_COLUMNS: &str = "id, key, value, description, created_at, updated_at";

#[derive(Clone)]
pub struct SystemConfigRepository {
    pool: PgPool,
}

impl SystemConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<SystemConfig>, AppError> {
        let sql = format!("SELECT {CONFIG_COLUMNS} FROM system_configs ORDER BY key");
        let configs = sqlx::query_as::<_, SystemConfig>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(configs)
    }

    pub async fn find_by_key<'e, E>(
        &self,
        executor: E,
        key: &str,
    ) -> Result<Option<SystemConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CONFIG_COLUMNS} FROM system_configs WHERE key = $1");
        let config = sqlx::query_as::<_, SystemConfig>(&sql)
            .bind(key)
            .fetch_optional(executor)
            .await?;
        Ok(config)
    }

    // UPSERT (Insert or Update)
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        key: &str,
        value: &Value,
        description: Option<&str>,
    ) -> Result<SystemConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO system_configs (key, value, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET
                value = EXCLUDED.value,
                description = COALESCE(EXCLUDED.description, system_configs.description),
                updated_at = NOW()
            RETURNING {CONFIG_COLUMNS}
            "#
        );
        let config = sqlx::query_as::<_, SystemConfig>(&sql)
            .bind(key)
            .bind(value)
            .bind(description)
            .fetch_one(executor)
            .await?;
        Ok(config)
    }

    pub async fn delete<'e, E>(&self, executor: E, key: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM system_configs WHERE key = $1")
            .bind(key)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
