// src/services/project_service.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    allocation::{
        editor::{displayed_months, validate_bulk_update, AllocationError},
        months::{MAX_YEAR, MIN_YEAR},
    },
    common::{db_utils::snapshot, error::AppError},
    db::{AuditRepository, ForecastRepository, PeriodRepository, ProjectRepository},
    models::{
        audit::{AuditContext, NewAuditLog},
        forecast::Forecast,
        period::ForecastPeriod,
        project::{
            CreateProjectPayload, Project, ProjectAllocation, UpdateAllocationsPayload,
            UpdateProjectPayload,
        },
        user::{Role, User},
    },
    services::forecast_service::{ensure_can_edit, ensure_can_view, ensure_editable},
};

#[derive(Clone)]
pub struct ProjectService {
    repo: ProjectRepository,
    forecast_repo: ForecastRepository,
    period_repo: PeriodRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
    fiscal_year_start_month: u32,
}

impl ProjectService {
    pub fn new(
        repo: ProjectRepository,
        forecast_repo: ForecastRepository,
        period_repo: PeriodRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
        fiscal_year_start_month: u32,
    ) -> Self {
        Self {
            repo,
            forecast_repo,
            period_repo,
            audit_repo,
            pool,
            fiscal_year_start_month,
        }
    }

    pub async fn list(&self, actor: &User, forecast_id: Option<Uuid>) -> Result<Vec<Project>, AppError> {
        let owner = (actor.role == Role::Contributor).then_some(actor.id);
        self.repo.list(forecast_id, owner).await
    }

    async fn find(&self, id: Uuid) -> Result<Project, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".into()))
    }

    async fn forecast(&self, id: Uuid) -> Result<Forecast, AppError> {
        self.forecast_repo
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

    /// Carrega o forecast pai e confere permissão de escrita + estado editável.
    async fn editable_forecast(&self, actor: &User, forecast_id: Uuid) -> Result<Forecast, AppError> {
        let forecast = self.forecast(forecast_id).await?;
        ensure_can_edit(actor, &forecast)?;
        let period = self.period(forecast.period_id).await?;
        ensure_editable(&forecast, &period)?;
        Ok(forecast)
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<Project, AppError> {
        let project = self.find(id).await?;
        let forecast = self.forecast(project.forecast_id).await?;
        ensure_can_view(actor, &forecast)?;
        Ok(project)
    }

    pub async fn create(
        &self,
        actor: &User,
        payload: CreateProjectPayload,
        audit: &AuditContext,
    ) -> Result<Project, AppError> {
        check_value(payload.estimated_value)?;
        check_dates(payload.start_date, payload.expected_close_date)?;
        self.editable_forecast(actor, payload.forecast_id).await?;

        let mut tx = self.pool.begin().await?;

        let project = self.repo.create(&mut *tx, &payload).await?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("PROJECT_CREATED", "project", project.id)
                    .new_values(snapshot(&project)),
            )
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateProjectPayload,
        audit: &AuditContext,
    ) -> Result<Project, AppError> {
        if let Some(value) = payload.estimated_value {
            check_value(value)?;
        }
        let before = self.find(id).await?;
        // Valida as datas resultantes, não só as enviadas
        check_dates(
            payload.start_date.or(before.start_date),
            payload.expected_close_date.unwrap_or(before.expected_close_date),
        )?;
        self.editable_forecast(actor, before.forecast_id).await?;

        let mut tx = self.pool.begin().await?;

        let project = self
            .repo
            .update(&mut *tx, id, &payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".into()))?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("PROJECT_UPDATED", "project", id)
                    .old(snapshot(&before))
                    .new_values(snapshot(&project)),
            )
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    pub async fn delete(&self, actor: &User, id: Uuid, audit: &AuditContext) -> Result<(), AppError> {
        let before = self.find(id).await?;
        self.editable_forecast(actor, before.forecast_id).await?;

        let mut tx = self.pool.begin().await?;

        if !self.repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("Project".into()));
        }

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("PROJECT_DELETED", "project", id).old(snapshot(&before)),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn allocations(&self, actor: &User, id: Uuid) -> Result<Vec<ProjectAllocation>, AppError> {
        let project = self.get(actor, id).await?;
        self.repo.list_allocations(&self.pool, project.id).await
    }

    /// Atualização em lote das alocações mensais. Só são aceitos os meses que a
    /// visualização informada exibe; tudo é gravado numa única transação.
    pub async fn update_allocations(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateAllocationsPayload,
        audit: &AuditContext,
    ) -> Result<Vec<ProjectAllocation>, AppError> {
        let view_mode = payload
            .view_mode()
            .ok_or_else(|| AppError::InvalidInput("fiscalYear is required for FISCAL_YEAR view".into()))?;
        let rows = allocation_rows(&payload)?;

        let project = self.find(id).await?;
        self.editable_forecast(actor, project.forecast_id).await?;

        let displayed = displayed_months(view_mode, project.window(), self.fiscal_year_start_month);
        validate_bulk_update(&displayed, payload.allocations.iter().map(|a| a.month))
            .map_err(allocation_error)?;

        let mut tx = self.pool.begin().await?;

        let before = self.repo.list_allocations(&mut *tx, id).await?;
        for (month, amount) in rows {
            self.repo.upsert_allocation(&mut *tx, id, month, amount).await?;
        }
        let after = self.repo.list_allocations(&mut *tx, id).await?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("ALLOCATIONS_UPDATED", "project", id)
                    .old(snapshot(&before))
                    .new_values(snapshot(&after)),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(project_id = %id, months = payload.allocations.len(), "alocações atualizadas");
        Ok(after)
    }
}

/// Maior valor que cabe em NUMERIC(15,2).
fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999_999, 2)
}

fn check_value(value: Decimal) -> Result<(), AppError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::InvalidInput("Estimated value cannot be negative".into()));
    }
    if value > max_amount() {
        return Err(AppError::InvalidInput(format!(
            "Estimated value cannot exceed {}",
            max_amount()
        )));
    }
    Ok(())
}

fn check_dates(start: Option<NaiveDate>, expected_close: NaiveDate) -> Result<(), AppError> {
    let in_range = |date: NaiveDate| (MIN_YEAR..=MAX_YEAR).contains(&date.year());
    if !in_range(expected_close) || start.is_some_and(|d| !in_range(d)) {
        return Err(AppError::InvalidInput(format!(
            "Project dates must be between {MIN_YEAR} and {MAX_YEAR}"
        )));
    }
    if start.is_some_and(|d| d > expected_close) {
        return Err(AppError::InvalidInput(
            "startDate must be on or before expectedCloseDate".into(),
        ));
    }
    Ok(())
}

/// Converte os valores do payload em linhas (primeiro dia do mês, valor) antes
/// de qualquer acesso ao banco.
fn allocation_rows(payload: &UpdateAllocationsPayload) -> Result<Vec<(NaiveDate, Decimal)>, AppError> {
    let mut rows = Vec::with_capacity(payload.allocations.len());
    for input in &payload.allocations {
        let amount = input.amount.value();
        if amount < 0.0 {
            return Err(allocation_error(AllocationError::NegativeAmount(input.month)));
        }
        let amount = Decimal::from_f64(amount)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid amount for {}", input.month)))?
            .round_dp(2);
        if amount > max_amount() {
            return Err(AppError::InvalidInput(format!(
                "Allocation for {} cannot exceed {}",
                input.month,
                max_amount()
            )));
        }
        rows.push((input.month.first_day(), amount));
    }
    Ok(rows)
}

fn allocation_error(err: AllocationError) -> AppError {
    AppError::bad_request(err.to_string())
}
