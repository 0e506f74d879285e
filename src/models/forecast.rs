// src/models/forecast.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::MarketSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "forecast_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastAction {
    Submit,
    Approve,
    Reject,
}

impl ForecastStatus {
    /// Máquina de estados: DRAFT -> SUBMITTED -> APPROVED | REJECTED.
    /// Um forecast rejeitado pode ser corrigido e submetido de novo.
    pub fn transition(self, action: ForecastAction) -> Option<ForecastStatus> {
        match (self, action) {
            (ForecastStatus::Draft | ForecastStatus::Rejected, ForecastAction::Submit) => {
                Some(ForecastStatus::Submitted)
            }
            (ForecastStatus::Submitted, ForecastAction::Approve) => Some(ForecastStatus::Approved),
            (ForecastStatus::Submitted, ForecastAction::Reject) => Some(ForecastStatus::Rejected),
            _ => None,
        }
    }

    /// Projetos só podem ser alterados em rascunho ou depois de uma rejeição.
    pub fn is_editable(self) -> bool {
        matches!(self, ForecastStatus::Draft | ForecastStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub id: Uuid,
    pub user_id: Uuid,
    pub period_id: Uuid,
    pub market_segment: MarketSegment,
    pub status: ForecastStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateForecastPayload {
    pub period_id: Uuid,
    pub market_segment: MarketSegment,
    /// Apenas ADMIN pode criar forecast em nome de outro usuário.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectForecastPayload {
    #[validate(length(min = 1, max = 2000, message = "A rejection reason is required"))]
    #[schema(example = "Probabilities for the Q3 backlog look too optimistic")]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ForecastFilter {
    pub period_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<ForecastStatus>,
    pub market_segment: Option<MarketSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_status_machine() {
        use ForecastAction::*;
        use ForecastStatus::*;

        assert_eq!(Draft.transition(Submit), Some(Submitted));
        assert_eq!(Submitted.transition(Approve), Some(Approved));
        assert_eq!(Submitted.transition(Reject), Some(Rejected));
        assert_eq!(Rejected.transition(Submit), Some(Submitted));

        assert_eq!(Draft.transition(Approve), None);
        assert_eq!(Approved.transition(Submit), None);
        assert_eq!(Approved.transition(Reject), None);
        assert_eq!(Submitted.transition(Submit), None);
    }

    #[test]
    fn only_draft_and_rejected_are_editable() {
        assert!(ForecastStatus::Draft.is_editable());
        assert!(ForecastStatus::Rejected.is_editable());
        assert!(!ForecastStatus::Submitted.is_editable());
        assert!(!ForecastStatus::Approved.is_editable());
    }
}
