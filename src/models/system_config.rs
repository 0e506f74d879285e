// src/models/system_config.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub id: Uuid,

    #[schema(example = "fiscal_year_start_month")]
    pub key: String,

    #[schema(value_type = Object)]
    pub value: Value,

    #[schema(example = "Mês de início do ano fiscal")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertConfigPayload {
    #[schema(value_type = Object)]
    pub value: Value,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Chaves aceitas: minúsculas, dígitos, '_' e '.', até 100 caracteres.
pub fn is_valid_config_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 100
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_keys_are_restricted() {
        assert!(is_valid_config_key("fiscal_year_start_month"));
        assert!(is_valid_config_key("reports.default_type"));
        assert!(!is_valid_config_key(""));
        assert!(!is_valid_config_key("Has Spaces"));
        assert!(!is_valid_config_key(&"a".repeat(101)));
    }
}
