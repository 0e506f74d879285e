// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::snapshot, error::AppError},
    db::{
        user_repo::{NewUser, UserChanges},
        AuditRepository, UserRepository,
    },
    models::{
        audit::{AuditContext, NewAuditLog},
        user::{CreateUserPayload, UpdateUserPayload, User},
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(repo: UserRepository, audit_repo: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".into()))
    }

    pub async fn create(
        &self,
        payload: CreateUserPayload,
        audit: &AuditContext,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(&payload.password).await?;
        let email = payload.email.trim().to_lowercase();

        let mut tx = self.pool.begin().await?;

        let user = self
            .repo
            .create(
                &mut *tx,
                NewUser {
                    email: &email,
                    password_hash: &password_hash,
                    first_name: payload.first_name.trim(),
                    last_name: payload.last_name.trim(),
                    role: payload.role,
                    market_segments: &payload.market_segments,
                },
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("USER_CREATED", "user", user.id).new_values(snapshot(&user)),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = %user.role, "usuário criado");
        Ok(user)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateUserPayload,
        audit: &AuditContext,
    ) -> Result<User, AppError> {
        let before = self.get(id).await?;

        // Um admin não pode tirar o próprio acesso
        if id == audit.user_id
            && (payload.is_active == Some(false)
                || payload.role.is_some_and(|r| r != before.role))
        {
            return Err(AppError::bad_request(
                "You cannot deactivate or change the role of your own account",
            ));
        }

        let password_hash = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let changes = UserChanges {
            email: payload.email.map(|e| e.trim().to_lowercase()),
            password_hash,
            first_name: payload.first_name.map(|s| s.trim().to_string()),
            last_name: payload.last_name.map(|s| s.trim().to_string()),
            role: payload.role,
            market_segments: payload.market_segments,
            is_active: payload.is_active,
        };

        let mut tx = self.pool.begin().await?;

        let user = self
            .repo
            .update(&mut *tx, id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User".into()))?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("USER_UPDATED", "user", id)
                    .old(snapshot(&before))
                    .new_values(snapshot(&user)),
            )
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid, audit: &AuditContext) -> Result<(), AppError> {
        if id == audit.user_id {
            return Err(AppError::bad_request("You cannot delete your own account"));
        }

        let before = self.get(id).await?;

        let mut tx = self.pool.begin().await?;

        if !self.repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("User".into()));
        }

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("USER_DELETED", "user", id).old(snapshot(&before)),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %id, "usuário removido");
        Ok(())
    }
}
