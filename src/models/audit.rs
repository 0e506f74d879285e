// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{middleware::client_info::ClientInfo, models::user::User};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    /// Fica nulo quando o usuário é removido
    pub user_id: Option<Uuid>,
    #[schema(example = "FORECAST_SUBMITTED")]
    pub action: String,
    #[schema(example = "forecast")]
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub old_values: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub new_values: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Quem fez a ação, e de onde.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditContext {
    pub fn new(user: &User, client: &ClientInfo) -> Self {
        Self {
            user_id: user.id,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub action: &'static str,
    pub resource_type: &'static str,
    pub resource_id: Option<Uuid>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
}

impl NewAuditLog {
    pub fn new(action: &'static str, resource_type: &'static str, resource_id: Uuid) -> Self {
        Self {
            action,
            resource_type,
            resource_id: Some(resource_id),
            old_values: None,
            new_values: None,
        }
    }

    pub fn old(mut self, values: Option<Value>) -> Self {
        self.old_values = values;
        self
    }

    pub fn new_values(mut self, values: Option<Value>) -> Self {
        self.new_values = values;
        self
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditFilter {
    pub resource_type: Option<String>,
    pub user_id: Option<Uuid>,
    /// Padrão 100, máximo 500
    pub limit: Option<i64>,
}

impl AuditFilter {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }
}
