// src/handlers/reports.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        client_info::ClientInfo,
        extract::{ValidJson, ValidPath, ValidQuery},
        rbac::{AdminOnly, Managers, RequireRole},
    },
    models::{
        audit::AuditContext,
        report::{GenerateReportPayload, ReportFilter},
    },
};

#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Relatórios gerados")),
    security(("api_jwt" = []))
)]
pub async fn list_reports(
    _: RequireRole<Managers>,
    State(app_state): State<AppState>,
    ValidQuery(filter): ValidQuery<ReportFilter>,
) -> Result<impl IntoResponse, AppError> {
    let reports = app_state.report_service.list(filter.period_id).await?;
    Ok(Json(json!({ "reports": reports })))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses((status = 200, description = "Relatório")),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    _: RequireRole<Managers>,
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.get(id).await?;
    Ok(Json(json!({ "report": report })))
}

#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "Reports",
    request_body = GenerateReportPayload,
    responses((status = 201, description = "Relatório gerado")),
    security(("api_jwt" = []))
)]
pub async fn generate_report(
    _: RequireRole<Managers>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidJson(payload): ValidJson<GenerateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    let report = app_state.report_service.generate(payload, &audit).await?;

    Ok((StatusCode::CREATED, Json(json!({ "report": report }))))
}

#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses((status = 200, description = "Relatório removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_report(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    app_state.report_service.delete(id, &audit).await?;
    Ok(Json(json!({ "message": "Report deleted" })))
}
