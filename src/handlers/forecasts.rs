// src/handlers/forecasts.rs

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
        extract::{ValidJson, ValidPath, ValidQuery},
        rbac::{AnyRole, Managers, RequireRole},
    },
    models::{
        audit::AuditContext,
        forecast::{CreateForecastPayload, ForecastFilter, RejectForecastPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/forecasts",
    tag = "Forecasts",
    params(ForecastFilter),
    responses((status = 200, description = "Forecasts visíveis para o usuário")),
    security(("api_jwt" = []))
)]
pub async fn list_forecasts(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    ValidQuery(filter): ValidQuery<ForecastFilter>,
) -> Result<impl IntoResponse, AppError> {
    let forecasts = app_state.forecast_service.list(&actor, filter).await?;
    Ok(Json(json!({ "forecasts": forecasts })))
}

#[utoipa::path(
    get,
    path = "/api/forecasts/{id}",
    tag = "Forecasts",
    params(("id" = Uuid, Path, description = "ID do forecast")),
    responses((status = 200, description = "Forecast")),
    security(("api_jwt" = []))
)]
pub async fn get_forecast(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let forecast = app_state.forecast_service.get(&actor, id).await?;
    Ok(Json(json!({ "forecast": forecast })))
}

#[utoipa::path(
    post,
    path = "/api/forecasts",
    tag = "Forecasts",
    request_body = CreateForecastPayload,
    responses(
        (status = 201, description = "Forecast criado"),
        (status = 400, description = "Já existe forecast para usuário, período e segmento")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_forecast(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidJson(payload): ValidJson<CreateForecastPayload>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    let forecast = app_state.forecast_service.create(&actor, payload, &audit).await?;

    Ok((StatusCode::CREATED, Json(json!({ "forecast": forecast }))))
}

#[utoipa::path(
    delete,
    path = "/api/forecasts/{id}",
    tag = "Forecasts",
    params(("id" = Uuid, Path, description = "ID do forecast")),
    responses((status = 200, description = "Forecast removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_forecast(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    app_state.forecast_service.delete(&actor, id, &audit).await?;
    Ok(Json(json!({ "message": "Forecast deleted" })))
}

#[utoipa::path(
    post,
    path = "/api/forecasts/{id}/submit",
    tag = "Forecasts",
    params(("id" = Uuid, Path, description = "ID do forecast")),
    responses((status = 200, description = "Forecast enviado para aprovação")),
    security(("api_jwt" = []))
)]
pub async fn submit_forecast(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    let forecast = app_state.forecast_service.submit(&actor, id, &audit).await?;
    Ok(Json(json!({ "forecast": forecast })))
}

#[utoipa::path(
    post,
    path = "/api/forecasts/{id}/approve",
    tag = "Forecasts",
    params(("id" = Uuid, Path, description = "ID do forecast")),
    responses((status = 200, description = "Forecast aprovado")),
    security(("api_jwt" = []))
)]
pub async fn approve_forecast(
    _: RequireRole<Managers>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    let forecast = app_state.forecast_service.approve(id, &audit).await?;
    Ok(Json(json!({ "forecast": forecast })))
}

#[utoipa::path(
    post,
    path = "/api/forecasts/{id}/reject",
    tag = "Forecasts",
    request_body = RejectForecastPayload,
    params(("id" = Uuid, Path, description = "ID do forecast")),
    responses((status = 200, description = "Forecast rejeitado")),
    security(("api_jwt" = []))
)]
pub async fn reject_forecast(
    _: RequireRole<Managers>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<RejectForecastPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let forecast = app_state
        .forecast_service
        .reject(id, &payload.reason, &audit)
        .await?;
    Ok(Json(json!({ "forecast": forecast })))
}
