// src/handlers/audit.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        extract::ValidQuery,
        rbac::{AdminOnly, RequireRole},
    },
    models::audit::AuditFilter,
};

#[utoipa::path(
    get,
    path = "/api/audit-logs",
    tag = "Audit",
    params(AuditFilter),
    responses((status = 200, description = "Trilha de auditoria, mais recentes primeiro")),
    security(("api_jwt" = []))
)]
pub async fn list_audit_logs(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    ValidQuery(filter): ValidQuery<AuditFilter>,
) -> Result<impl IntoResponse, AppError> {
    let logs = app_state.audit_repo.list(&filter).await?;
    Ok(Json(json!({ "auditLogs": logs })))
}
