// src/services/period_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::snapshot, error::AppError},
    db::{period_repo::PeriodChanges, AuditRepository, PeriodRepository},
    models::{
        audit::{AuditContext, NewAuditLog},
        period::{check_period_dates, CreatePeriodPayload, ForecastPeriod, PeriodStatus, UpdatePeriodPayload},
    },
};

#[derive(Clone)]
pub struct PeriodService {
    repo: PeriodRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl PeriodService {
    pub fn new(repo: PeriodRepository, audit_repo: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<ForecastPeriod>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<ForecastPeriod, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Forecast period".into()))
    }

    pub async fn create(
        &self,
        payload: CreatePeriodPayload,
        audit: &AuditContext,
    ) -> Result<ForecastPeriod, AppError> {
        check_period_dates(payload.start_date, payload.end_date, payload.submission_deadline)
            .map_err(|msg| AppError::InvalidInput(msg.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let period = self
            .repo
            .create(
                &mut *tx,
                payload.name.trim(),
                payload.start_date,
                payload.end_date,
                payload.submission_deadline,
                payload.status.unwrap_or(PeriodStatus::Planning),
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("PERIOD_CREATED", "forecast_period", period.id)
                    .new_values(snapshot(&period)),
            )
            .await?;

        tx.commit().await?;
        Ok(period)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdatePeriodPayload,
        audit: &AuditContext,
    ) -> Result<ForecastPeriod, AppError> {
        let before = self.get(id).await?;

        // Valida as datas resultantes, não só as enviadas
        check_period_dates(
            payload.start_date.unwrap_or(before.start_date),
            payload.end_date.unwrap_or(before.end_date),
            payload.submission_deadline.unwrap_or(before.submission_deadline),
        )
        .map_err(|msg| AppError::InvalidInput(msg.to_string()))?;

        let changes = PeriodChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            start_date: payload.start_date,
            end_date: payload.end_date,
            submission_deadline: payload.submission_deadline,
            status: payload.status,
        };

        let mut tx = self.pool.begin().await?;

        let period = self
            .repo
            .update(&mut *tx, id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Forecast period".into()))?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("PERIOD_UPDATED", "forecast_period", id)
                    .old(snapshot(&before))
                    .new_values(snapshot(&period)),
            )
            .await?;

        tx.commit().await?;
        Ok(period)
    }

    pub async fn set_locked(
        &self,
        id: Uuid,
        locked: bool,
        audit: &AuditContext,
    ) -> Result<ForecastPeriod, AppError> {
        let mut tx = self.pool.begin().await?;

        let period = self
            .repo
            .set_locked(&mut *tx, id, locked)
            .await?
            .ok_or_else(|| AppError::NotFound("Forecast period".into()))?;

        let action = if locked { "PERIOD_LOCKED" } else { "PERIOD_UNLOCKED" };
        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new(action, "forecast_period", id).new_values(snapshot(&period)),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(period_id = %id, locked, "trava do período alterada");
        Ok(period)
    }

    pub async fn delete(&self, id: Uuid, audit: &AuditContext) -> Result<(), AppError> {
        let before = self.get(id).await?;

        let mut tx = self.pool.begin().await?;

        if !self.repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("Forecast period".into()));
        }

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("PERIOD_DELETED", "forecast_period", id).old(snapshot(&before)),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
