// src/services/forecast_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::snapshot, error::AppError},
    db::{AuditRepository, ForecastRepository, PeriodRepository, UserRepository},
    middleware::rbac::{Managers, RolePolicy},
    models::{
        audit::{AuditContext, NewAuditLog},
        forecast::{CreateForecastPayload, Forecast, ForecastAction, ForecastFilter, ForecastStatus},
        period::ForecastPeriod,
        user::{Role, User},
    },
};

/// Dono do forecast ou gestores podem ler.
pub(crate) fn ensure_can_view(actor: &User, forecast: &Forecast) -> Result<(), AppError> {
    if forecast.user_id == actor.id || Managers::allows(actor.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(actor.role))
    }
}

/// Alterar conteúdo: só o dono, ou ADMIN.
pub(crate) fn ensure_can_edit(actor: &User, forecast: &Forecast) -> Result<(), AppError> {
    if forecast.user_id == actor.id || actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(actor.role))
    }
}

/// Envio para aprovação: só o próprio dono, nem ADMIN envia por outro.
pub(crate) fn ensure_can_submit(actor: &User, forecast: &Forecast) -> Result<(), AppError> {
    if forecast.user_id == actor.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(actor.role))
    }
}

/// O conteúdo de um forecast só muda em DRAFT/REJECTED e com o período aberto.
pub(crate) fn ensure_editable(forecast: &Forecast, period: &ForecastPeriod) -> Result<(), AppError> {
    if !period.accepts_edits() {
        return Err(AppError::bad_request("Forecast period is locked or closed"));
    }
    if !forecast.status.is_editable() {
        return Err(AppError::bad_request(format!(
            "Forecast in status {:?} cannot be modified",
            forecast.status
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ForecastService {
    repo: ForecastRepository,
    period_repo: PeriodRepository,
    user_repo: UserRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl ForecastService {
    pub fn new(
        repo: ForecastRepository,
        period_repo: PeriodRepository,
        user_repo: UserRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, period_repo, user_repo, audit_repo, pool }
    }

    pub async fn list(&self, actor: &User, mut filter: ForecastFilter) -> Result<Vec<Forecast>, AppError> {
        // Contribuidor só enxerga os próprios forecasts
        if actor.role == Role::Contributor {
            filter.user_id = Some(actor.id);
        }
        self.repo.list(&filter).await
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<Forecast, AppError> {
        let forecast = self.find(id).await?;
        ensure_can_view(actor, &forecast)?;
        Ok(forecast)
    }

    pub(crate) async fn find(&self, id: Uuid) -> Result<Forecast, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Forecast".into()))
    }

    async fn period(&self, id: Uuid) -> Result<ForecastPeriod, AppError> {
        self.period_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Forecast period".into()))
    }

    pub async fn create(
        &self,
        actor: &User,
        payload: CreateForecastPayload,
        audit: &AuditContext,
    ) -> Result<Forecast, AppError> {
        let owner = match payload.user_id {
            Some(user_id) if user_id != actor.id => {
                if !actor.is_admin() {
                    return Err(AppError::Forbidden(actor.role));
                }
                self.user_repo
                    .find_by_id(user_id)
                    .await?
                    .ok_or_else(|| AppError::InvalidInput("Referenced user does not exist".into()))?
            }
            _ => actor.clone(),
        };

        if !owner.handles_segment(payload.market_segment) {
            return Err(AppError::InvalidInput(format!(
                "User is not assigned to market segment {}",
                payload.market_segment.as_str()
            )));
        }

        let period = self.period(payload.period_id).await?;
        if !period.accepts_edits() {
            return Err(AppError::bad_request("Forecast period is locked or closed"));
        }

        let mut tx = self.pool.begin().await?;

        let forecast = self
            .repo
            .create(&mut *tx, owner.id, period.id, payload.market_segment)
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("FORECAST_CREATED", "forecast", forecast.id)
                    .new_values(snapshot(&forecast)),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            forecast_id = %forecast.id,
            user_id = %owner.id,
            period_id = %period.id,
            segment = payload.market_segment.as_str(),
            "forecast criado"
        );
        Ok(forecast)
    }

    pub async fn submit(&self, actor: &User, id: Uuid, audit: &AuditContext) -> Result<Forecast, AppError> {
        let forecast = self.find(id).await?;
        ensure_can_submit(actor, &forecast)?;
        let period = self.period(forecast.period_id).await?;
        if !period.accepts_edits() {
            return Err(AppError::bad_request("Forecast period is locked or closed"));
        }

        self.apply_transition(forecast, ForecastAction::Submit, None, audit).await
    }

    pub async fn approve(&self, id: Uuid, audit: &AuditContext) -> Result<Forecast, AppError> {
        let forecast = self.find(id).await?;
        self.apply_transition(forecast, ForecastAction::Approve, None, audit).await
    }

    pub async fn reject(&self, id: Uuid, reason: &str, audit: &AuditContext) -> Result<Forecast, AppError> {
        let forecast = self.find(id).await?;
        self.apply_transition(forecast, ForecastAction::Reject, Some(reason.trim()), audit)
            .await
    }

    async fn apply_transition(
        &self,
        forecast: Forecast,
        action: ForecastAction,
        reason: Option<&str>,
        audit: &AuditContext,
    ) -> Result<Forecast, AppError> {
        let target = forecast.status.transition(action).ok_or_else(|| {
            AppError::bad_request(format!(
                "Cannot {} a forecast in status {:?}",
                action_verb(action),
                forecast.status
            ))
        })?;

        let mut tx = self.pool.begin().await?;

        let updated = self
            .repo
            .transition(&mut *tx, forecast.id, forecast.status, target, reason)
            .await?
            // Outra requisição mudou o status entre a leitura e o UPDATE
            .ok_or_else(|| AppError::Client {
                status: axum::http::StatusCode::CONFLICT,
                message: "Forecast status changed concurrently, reload and try again".into(),
            })?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new(audit_action(target), "forecast", forecast.id)
                    .old(snapshot(&forecast))
                    .new_values(snapshot(&updated)),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(forecast_id = %updated.id, status = ?updated.status, "status do forecast alterado");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, id: Uuid, audit: &AuditContext) -> Result<(), AppError> {
        let forecast = self.find(id).await?;
        ensure_can_edit(actor, &forecast)?;
        if !actor.is_admin() && forecast.status != ForecastStatus::Draft {
            return Err(AppError::bad_request("Only draft forecasts can be deleted"));
        }

        let mut tx = self.pool.begin().await?;

        if !self.repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("Forecast".into()));
        }

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("FORECAST_DELETED", "forecast", id).old(snapshot(&forecast)),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn action_verb(action: ForecastAction) -> &'static str {
    match action {
        ForecastAction::Submit => "submit",
        ForecastAction::Approve => "approve",
        ForecastAction::Reject => "reject",
    }
}

fn audit_action(status: ForecastStatus) -> &'static str {
    match status {
        ForecastStatus::Submitted => "FORECAST_SUBMITTED",
        ForecastStatus::Approved => "FORECAST_APPROVED",
        ForecastStatus::Rejected => "FORECAST_REJECTED",
        ForecastStatus::Draft => "FORECAST_REOPENED",
    }
}
