// src/handlers/projects.rs

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
        rbac::{AnyRole, RequireRole},
    },
    models::{
        audit::AuditContext,
        project::{CreateProjectPayload, ProjectFilter, UpdateAllocationsPayload, UpdateProjectPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    params(ProjectFilter),
    responses((status = 200, description = "Projetos")),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    ValidQuery(filter): ValidQuery<ProjectFilter>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state.project_service.list(&actor, filter.forecast_id).await?;
    Ok(Json(json!({ "projects": projects })))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses((status = 200, description = "Projeto")),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state.project_service.get(&actor, id).await?;
    Ok(Json(json!({ "project": project })))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses((status = 201, description = "Projeto criado")),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidJson(payload): ValidJson<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let project = app_state.project_service.create(&actor, payload, &audit).await?;

    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    request_body = UpdateProjectPayload,
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses((status = 200, description = "Projeto atualizado")),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let project = app_state
        .project_service
        .update(&actor, id, payload, &audit)
        .await?;

    Ok(Json(json!({ "project": project })))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses((status = 200, description = "Projeto removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    app_state.project_service.delete(&actor, id, &audit).await?;
    Ok(Json(json!({ "message": "Project deleted" })))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/allocations",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses((status = 200, description = "Alocações mensais")),
    security(("api_jwt" = []))
)]
pub async fn get_allocations(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let allocations = app_state.project_service.allocations(&actor, id).await?;
    Ok(Json(json!({ "allocations": allocations })))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}/allocations",
    tag = "Projects",
    request_body = UpdateAllocationsPayload,
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Alocações gravadas"),
        (status = 400, description = "Mês fora da visualização atual")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_allocations(
    _: RequireRole<AnyRole>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateAllocationsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let allocations = app_state
        .project_service
        .update_allocations(&actor, id, payload, &audit)
        .await?;

    Ok(Json(json!({ "allocations": allocations })))
}
