// src/handlers/auth.rs

use axum::{extract::State, Json};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        extract::ValidJson,
        rbac::{AnyRole, RequireRole},
    },
    models::user::{AuthResponse, LoginPayload},
};

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ValidJson(payload): ValidJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let (token, user) = app_state
        .auth_service
        .login_user(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(AuthResponse { token, user }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    _: RequireRole<AnyRole>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<Value> {
    Json(json!({ "user": user }))
}
