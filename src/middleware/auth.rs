// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::user::User};

// O middleware em si: valida o Bearer e pendura o usuário nas extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(bearer.token()).await?;

    tracing::debug!(user_id = %user.id, role = %user.role, "requisição autenticada");

    parts.extensions.insert(AuthenticatedUser(user));
    Ok(next.run(Request::from_parts(parts, body)).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
