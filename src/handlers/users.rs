// src/handlers/users.rs

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
        rbac::{AdminOnly, Managers, RequireRole},
    },
    models::{
        audit::AuditContext,
        user::{CreateUserPayload, UpdateUserPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Lista de usuários")),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    _: RequireRole<Managers>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list().await?;
    Ok(Json(json!({ "users": users })))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    _: RequireRole<Managers>,
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.get(id).await?;
    Ok(Json(json!({ "user": user })))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado"),
        (status = 400, description = "Dados inválidos ou e-mail duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidJson(payload): ValidJson<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let user = app_state.user_service.create(payload, &audit).await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses((status = 200, description = "Usuário atualizado")),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let user = app_state.user_service.update(id, payload, &audit).await?;

    Ok(Json(json!({ "user": user })))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário removido"),
        (status = 403, description = "Apenas ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let audit = AuditContext::new(&actor, &client);
    app_state.user_service.delete(id, &audit).await?;

    Ok(Json(json!({ "message": "User deleted" })))
}
