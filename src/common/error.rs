// src/common/error.rs

use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{common::db_utils::unique_violation_field, config::RuntimeMode, models::user::Role};

const GENERIC_SERVER_MESSAGE: &str = "Internal server error";

// Erros classificados no ponto da falha. Quem decide status e mensagem
// final é o middleware `normalize_errors`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Duplicate value for field: {0}")]
    DuplicateField(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or missing authentication token")]
    InvalidToken,

    #[error("Authentication token has expired")]
    TokenExpired,

    #[error("Role {0} is not allowed to perform this action")]
    Forbidden(Role),

    #[error("{message}")]
    Client { status: StatusCode, message: String },

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::Client {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::DuplicateField(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Client { status, .. } => *status,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => "VALIDATION_ERROR",
            AppError::DuplicateField(_) => "DUPLICATE_FIELD",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Client { status, .. } if !status.is_server_error() => "CLIENT_ERROR",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::ValidationError(errors) => {
                let mut fields = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for e in field_errors.iter() {
                        fields.push(json!({
                            "field": field.to_string(),
                            "value": e.params.get("value").cloned().unwrap_or(Value::Null),
                            "message": e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string()),
                        }));
                    }
                }
                Some(json!({ "fields": fields }))
            }
            AppError::DuplicateField(field) => Some(json!({ "field": field })),
            _ => None,
        }
    }

    /// Converte o erro no formato estável da API, aplicando a política do modo de execução.
    pub fn to_api_error(&self, mode: RuntimeMode) -> ApiError {
        let status = self.status();
        let message = if status.is_server_error() && mode.is_production() {
            GENERIC_SERVER_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        ApiError {
            status,
            code: self.code(),
            message,
            details: self.details(),
            stack: (!mode.is_production()).then(|| format!("{self:?}")),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => return AppError::NotFound("Record".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateField(
                        unique_violation_field(db_err.constraint()).to_string(),
                    );
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::InvalidInput(
                        "Referenced record does not exist".to_string(),
                    );
                }
                if db_err.is_check_violation() {
                    return AppError::InvalidInput(format!(
                        "Value violates constraint {}",
                        db_err.constraint().unwrap_or("unknown")
                    ));
                }
                match db_err.code().as_deref() {
                    // invalid_text_representation (cast falhou)
                    Some("22P02") => {
                        return AppError::InvalidInput("Malformed identifier or value".to_string());
                    }
                    // numeric_value_out_of_range
                    Some("22003") => {
                        return AppError::InvalidInput("Numeric value out of range".to_string());
                    }
                    // datetime_field_overflow
                    Some("22008") => {
                        return AppError::InvalidInput("Date value out of range".to_string());
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        AppError::DatabaseError(err)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(format!("Malformed path parameter: {}", rejection.body_text()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Corpo seguro por padrão; o middleware de normalização refaz a resposta
        // a partir do erro guardado nas extensions.
        let mut response = self.to_api_error(RuntimeMode::Production).into_response();
        response.extensions_mut().insert(Arc::new(self));
        response
    }
}

/// Corpo de erro que vai para o cliente: `{ "error": { code, message, details? } }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
    pub stack: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = Map::new();
        error.insert("code".into(), Value::from(self.code));
        error.insert("message".into(), Value::from(self.message));
        if let Some(details) = self.details {
            error.insert("details".into(), details);
        }
        if let Some(stack) = self.stack {
            error.insert("stack".into(), Value::from(stack));
        }

        (self.status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{borrow::Cow, error::Error as StdError, fmt};
    use validator::Validate;

    #[derive(Debug)]
    struct FakeDbError {
        kind: sqlx::error::ErrorKind,
        code: Option<&'static str>,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl StdError for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.kind {
                sqlx::error::ErrorKind::UniqueViolation => sqlx::error::ErrorKind::UniqueViolation,
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    sqlx::error::ErrorKind::ForeignKeyViolation
                }
                sqlx::error::ErrorKind::CheckViolation => sqlx::error::ErrorKind::CheckViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn db_error(
        kind: sqlx::error::ErrorKind,
        code: Option<&'static str>,
        constraint: Option<&'static str>,
    ) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { kind, code, constraint }))
    }

    #[test]
    fn duplicate_forecast_maps_to_duplicate_field() {
        let err: AppError = db_error(
            sqlx::error::ErrorKind::UniqueViolation,
            Some("23505"),
            Some("forecasts_user_period_segment_key"),
        )
        .into();

        let api = err.to_api_error(RuntimeMode::Production);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "DUPLICATE_FIELD");
        assert_eq!(
            api.details,
            Some(json!({ "field": "userId, periodId, marketSegment" }))
        );
    }

    #[test]
    fn cast_failure_and_bad_reference_are_validation_errors() {
        let cast: AppError =
            db_error(sqlx::error::ErrorKind::Other, Some("22P02"), None).into();
        assert_eq!(cast.code(), "VALIDATION_ERROR");
        assert_eq!(cast.status(), StatusCode::BAD_REQUEST);

        let fk: AppError = db_error(
            sqlx::error::ErrorKind::ForeignKeyViolation,
            Some("23503"),
            Some("forecasts_period_id_fkey"),
        )
        .into();
        assert_eq!(fk.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn out_of_range_values_are_validation_errors() {
        for code in ["22003", "22008"] {
            let err: AppError = db_error(sqlx::error::ErrorKind::Other, Some(code), None).into();
            let api = err.to_api_error(RuntimeMode::Production);
            assert_eq!(api.status, StatusCode::BAD_REQUEST, "{code}");
            assert_eq!(api.code, "VALIDATION_ERROR", "{code}");
        }
    }

    #[test]
    fn missing_row_is_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn unclassified_database_error_is_hidden_in_production() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();

        let prod = err.to_api_error(RuntimeMode::Production);
        assert_eq!(prod.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(prod.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(prod.message, GENERIC_SERVER_MESSAGE);
        assert!(prod.stack.is_none());

        let dev = err.to_api_error(RuntimeMode::Development);
        assert_ne!(dev.message, GENERIC_SERVER_MESSAGE);
        assert!(dev.stack.is_some());
    }

    #[test]
    fn declared_client_status_maps_to_client_error() {
        let err = AppError::bad_request("Forecast period is locked");
        let api = err.to_api_error(RuntimeMode::Production);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "CLIENT_ERROR");
        assert_eq!(api.message, "Forecast period is locked");
    }

    #[test]
    fn expired_jwt_maps_to_token_expired() {
        let expired: AppError =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::ExpiredSignature)
                .into();
        assert_eq!(expired.code(), "TOKEN_EXPIRED");

        let invalid: AppError =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidSignature)
                .into();
        assert_eq!(invalid.code(), "INVALID_TOKEN");
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
        probability: i32,
    }

    #[test]
    fn schema_validation_reports_field_and_value() {
        let errors = Payload { probability: 150 }.validate().unwrap_err();
        let api = AppError::from(errors).to_api_error(RuntimeMode::Production);

        assert_eq!(api.code, "VALIDATION_ERROR");
        let details = api.details.unwrap();
        let field = &details["fields"][0];
        assert_eq!(field["field"], "probability");
        assert_eq!(field["value"], 150);
        assert_eq!(field["message"], "Probability must be between 0 and 100");
    }
}
