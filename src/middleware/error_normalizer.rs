// src/middleware/error_normalizer.rs

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{common::error::AppError, config::AppState, middleware::client_info::ClientInfo};

/// Ponto único de normalização: todo `AppError` que sobe de um handler, extrator
/// ou middleware é logado com o contexto da requisição e convertido no corpo
/// `{ "error": { code, message, details? } }` conforme o modo de execução.
pub async fn normalize_errors(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client = ClientInfo::from_parts(request.headers(), request.extensions());

    let response = next.run(request).await;

    let Some(err) = response.extensions().get::<Arc<AppError>>().cloned() else {
        return response;
    };

    let api_error = err.to_api_error(app_state.config.runtime_mode);
    let ip = client.ip_address.as_deref().unwrap_or("-");
    let user_agent = client.user_agent.as_deref().unwrap_or("-");

    if api_error.status.is_server_error() {
        tracing::error!(
            error = %err,
            stack = ?err,
            %method,
            url = %uri,
            ip,
            user_agent,
            status = api_error.status.as_u16(),
            "erro ao processar requisição"
        );
    } else {
        tracing::warn!(
            error = %err,
            stack = ?err,
            %method,
            url = %uri,
            ip,
            user_agent,
            status = api_error.status.as_u16(),
            "requisição rejeitada"
        );
    }

    api_error.into_response()
}
