// src/common/db_utils.rs

use serde::Serialize;
use serde_json::Value;

/// Traduz o nome da constraint UNIQUE do Postgres no campo exposto pela API.
pub(crate) fn unique_violation_field(constraint: Option<&str>) -> &str {
    match constraint {
        Some("users_email_key") => "email",
        Some("forecasts_user_period_segment_key") => "userId, periodId, marketSegment",
        Some("project_allocations_project_month_key") => "month",
        Some("system_configs_key_key") => "key",
        Some(other) => other,
        None => "unknown",
    }
}

// Snapshot usado na trilha de auditoria
pub(crate) fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}
