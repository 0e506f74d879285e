pub mod audit;
pub mod auth;
pub mod forecasts;
pub mod navigation;
pub mod periods;
pub mod projects;
pub mod reports;
pub mod settings;
pub mod users;

use axum::http::{Method, StatusCode, Uri};

use crate::common::error::AppError;

// GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

// Qualquer rota não mapeada cai aqui e sai como NOT_FOUND padronizado
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {}", uri.path()))
}

// Rota existe, mas não para esse verbo
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::Client {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: format!("Method {method} is not allowed on {}", uri.path()),
    }
}
