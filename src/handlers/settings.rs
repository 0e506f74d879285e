// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::{db_utils::snapshot, error::AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        client_info::ClientInfo,
        extract::{ValidJson, ValidPath},
        rbac::{AdminOnly, RequireRole},
    },
    models::{
        audit::{AuditContext, NewAuditLog},
        system_config::{is_valid_config_key, UpsertConfigPayload},
    },
};

fn check_key(key: &str) -> Result<(), AppError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid configuration key: {key}")))
    }
}

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Configurações do sistema")),
    security(("api_jwt" = []))
)]
pub async fn list_settings(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_repo.list().await?;
    Ok((StatusCode::OK, Json(json!({ "settings": settings }))))
}

// PUT /api/settings/{key}
#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    tag = "Settings",
    request_body = UpsertConfigPayload,
    params(("key" = String, Path, description = "Chave da configuração")),
    responses((status = 200, description = "Configuração gravada")),
    security(("api_jwt" = []))
)]
pub async fn upsert_setting(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(key): ValidPath<String>,
    ValidJson(payload): ValidJson<UpsertConfigPayload>,
) -> Result<impl IntoResponse, AppError> {
    check_key(&key)?;
    payload.validate()?;

    let audit = AuditContext::new(&actor, &client);
    let mut tx = app_state.db_pool.begin().await?;

    let before = app_state.settings_repo.find_by_key(&mut *tx, &key).await?;
    let setting = app_state
        .settings_repo
        .upsert(&mut *tx, &key, &payload.value, payload.description.as_deref())
        .await?;

    app_state
        .audit_repo
        .record(
            &mut *tx,
            &audit,
            NewAuditLog::new("CONFIG_UPDATED", "system_config", setting.id)
                .old(before.as_ref().and_then(snapshot))
                .new_values(snapshot(&setting)),
        )
        .await?;

    tx.commit().await?;

    tracing::info!(key = %setting.key, "configuração do sistema atualizada");
    Ok((StatusCode::OK, Json(json!({ "setting": setting }))))
}

// DELETE /api/settings/{key}
#[utoipa::path(
    delete,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Chave da configuração")),
    responses(
        (status = 200, description = "Configuração removida"),
        (status = 404, description = "Chave inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_setting(
    _: RequireRole<AdminOnly>,
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    client: ClientInfo,
    ValidPath(key): ValidPath<String>,
) -> Result<impl IntoResponse, AppError> {
    check_key(&key)?;

    let audit = AuditContext::new(&actor, &client);
    let mut tx = app_state.db_pool.begin().await?;

    let before = app_state
        .settings_repo
        .find_by_key(&mut *tx, &key)
        .await?
        .ok_or_else(|| AppError::NotFound("Configuration key".into()))?;

    app_state.settings_repo.delete(&mut *tx, &key).await?;

    app_state
        .audit_repo
        .record(
            &mut *tx,
            &audit,
            NewAuditLog::new("CONFIG_DELETED", "system_config", before.id).old(snapshot(&before)),
        )
        .await?;

    tx.commit().await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Setting deleted" }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_keys_are_validation_errors() {
        assert!(check_key("fiscal_year_start_month").is_ok());
        let err = check_key("DROP TABLE").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
