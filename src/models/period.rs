// src/models/period.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "period_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    Planning,
    Active,
    Closed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub id: Uuid,
    #[schema(example = "FY2025 Q3")]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub submission_deadline: NaiveDate,
    pub status: PeriodStatus,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ForecastPeriod {
    /// Um período aceita edições enquanto não estiver travado nem encerrado.
    pub fn accepts_edits(&self) -> bool {
        !self.is_locked && matches!(self.status, PeriodStatus::Planning | PeriodStatus::Active)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeriodPayload {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    #[schema(example = "FY2025 Q3")]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub submission_deadline: NaiveDate,
    pub status: Option<PeriodStatus>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePeriodPayload {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub submission_deadline: Option<NaiveDate>,
    pub status: Option<PeriodStatus>,
}

/// Regras de datas: início <= fim e prazo de submissão dentro do período.
pub fn check_period_dates(
    start_date: NaiveDate,
    end_date: NaiveDate,
    submission_deadline: NaiveDate,
) -> Result<(), &'static str> {
    if start_date > end_date {
        return Err("Start date must be on or before end date");
    }
    if submission_deadline > end_date {
        return Err("Submission deadline must be on or before end date");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_dates_are_checked() {
        assert!(check_period_dates(date(2025, 1, 1), date(2025, 3, 31), date(2025, 3, 15)).is_ok());
        assert!(check_period_dates(date(2025, 4, 1), date(2025, 3, 31), date(2025, 3, 15)).is_err());
        assert!(check_period_dates(date(2025, 1, 1), date(2025, 3, 31), date(2025, 4, 15)).is_err());
    }

    #[test]
    fn locked_or_closed_periods_reject_edits() {
        let mut period = ForecastPeriod {
            id: Uuid::new_v4(),
            name: "Q1".into(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 3, 31),
            submission_deadline: date(2025, 3, 15),
            status: PeriodStatus::Active,
            is_locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(period.accepts_edits());

        period.is_locked = true;
        assert!(!period.accepts_edits());

        period.is_locked = false;
        period.status = PeriodStatus::Closed;
        assert!(!period.accepts_edits());
    }
}
