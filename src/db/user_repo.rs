// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::user::{MarketSegment, Role, User},
};

const USER_COLUMNS: &str = r#"
    id, email, password_hash, first_name, last_name, role, market_segments,
    is_active, last_login_at, created_at, updated_at
"#;

/// Campos de um novo usuário, com a senha já em hash.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: Role,
    pub market_segments: &'a [MarketSegment],
}

/// Alterações parciais; `None` mantém o valor atual.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub market_segments: Option<Vec<MarketSegment>>,
    pub is_active: Option<bool>,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY last_name, first_name");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Cria um novo usuário. E-mail duplicado vira DUPLICATE_FIELD via From<sqlx::Error>.
    pub async fn create<'e, E>(&self, executor: E, new_user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role, market_segments)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new_user.email)
            .bind(new_user.password_hash)
            .bind(new_user.first_name)
            .bind(new_user.last_name)
            .bind(new_user.role)
            .bind(new_user.market_segments)
            .fetch_one(executor)
            .await?;
        Ok(user)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                role = COALESCE($6, role),
                market_segments = COALESCE($7, market_segments),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.role)
            .bind(changes.market_segments)
            .bind(changes.is_active)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    /// Remove o usuário. Forecasts caem em cascata; audit_logs ficam com user_id nulo.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
