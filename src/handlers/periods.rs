// src/handlers/periods.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        client_info::ClientInfo,
        extract::{ValidJson, ValidPath},
        rbac::{AdminOnly, AnyRole, Leadership, RequireRole},
    },
    models::{
        audit::AuditContext,
        period::{CreatePeriodPayload, UpdatePeriodPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/periods",
    tag = "Periods",
    responses((status = 200, description = "Períodos de forecast")),
    security(("api_jwt" = []))
)]
pub async fn list_periods(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let periods = app_state.period_service.list().await?;
    Ok(Json(json!({ "periods": periods })))
}

#[utoipa::path(
    get,
    path = "/api/periods/{id}",
    tag = "Periods",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses((status = 200, description = "Período")),
    security(("api_jwt" = []))
)]
pub async fn get_period(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let period = app_state.period_service.get(id).await?;
    Ok(Json(json!({ "period": period })))
}

#[utoipa::path(
    post,
    path = "/api/periods",
    tag = "Periods",
    request_body = CreatePeriodPayload,
    responses((status = 201, description = "Período criado")),
    security(("api_jwt" = []))
)]
pub async fn create_period(
    _: RequireRole<Leadership>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidJson(payload): ValidJson<CreatePeriodPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let period = app_state.period_service.create(payload, &audit).await?;

    Ok((StatusCode::CREATED, Json(json!({ "period": period }))))
}

#[utoipa::path(
    put,
    path = "/api/periods/{id}",
    tag = "Periods",
    request_body = UpdatePeriodPayload,
    params(("id" = Uuid, Path, description = "ID do período")),
    responses((status = 200, description = "Período atualizado")),
    security(("api_jwt" = []))
)]
pub async fn update_period(
    _: RequireRole<Leadership>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdatePeriodPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let period = app_state.period_service.update(id, payload, &audit).await?;

    Ok(Json(json!({ "period": period })))
}

#[utoipa::path(
    post,
    path = "/api/periods/{id}/lock",
    tag = "Periods",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses((status = 200, description = "Período travado")),
    security(("api_jwt" = []))
)]
pub async fn lock_period(
    _: RequireRole<Leadership>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    let period = app_state.period_service.set_locked(id, true, &audit).await?;
    Ok(Json(json!({ "period": period })))
}

#[utoipa::path(
    post,
    path = "/api/periods/{id}/unlock",
    tag = "Periods",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses((status = 200, description = "Período destravado")),
    security(("api_jwt" = []))
)]
pub async fn unlock_period(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    let period = app_state.period_service.set_locked(id, false, &audit).await?;
    Ok(Json(json!({ "period": period })))
}

#[utoipa::path(
    delete,
    path = "/api/periods/{id}",
    tag = "Periods",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses((status = 200, description = "Período removido junto com forecasts e relatórios")),
    security(("api_jwt" = []))
)]
pub async fn delete_period(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    app_state.period_service.delete(id, &audit).await?;
    Ok(Json(json!({ "message": "Forecast period deleted" })))
}
