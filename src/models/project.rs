// src/models/project.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::allocation::{
    editor::{ProjectWindow, ViewMode, ViewModeKind},
    format::parse_formatted_number,
    months::Month,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectType {
    Backlog,
    Swag,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub forecast_id: Uuid,
    #[schema(example = "Wastewater plant expansion")]
    pub name: String,
    pub project_type: ProjectType,
    #[schema(example = "1250000.00")]
    pub estimated_value: Decimal,
    #[schema(example = 60)]
    pub probability: i32,
    pub expected_close_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Janela nominal: do mês de início (ou de criação) ao mês de fechamento previsto.
    pub fn window(&self) -> ProjectWindow {
        let start = self
            .start_date
            .map(Month::from_date)
            .unwrap_or_else(|| Month::from_date(self.created_at.date_naive()));
        ProjectWindow {
            start,
            end: Month::from_date(self.expected_close_date),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    pub forecast_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Project name is required"))]
    pub name: String,

    pub project_type: ProjectType,

    #[schema(value_type = f64, example = 1250000.0)]
    pub estimated_value: Decimal,

    #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
    pub probability: i32,

    pub expected_close_date: NaiveDate,
    pub start_date: Option<NaiveDate>,

    #[validate(length(max = 200))]
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPayload {
    #[validate(length(min = 1, max = 200, message = "Project name cannot be empty"))]
    pub name: Option<String>,

    pub project_type: Option<ProjectType>,

    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,

    #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
    pub probability: Option<i32>,

    pub expected_close_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,

    #[validate(length(max = 200))]
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProjectFilter {
    pub forecast_id: Option<Uuid>,
}

// --- ALOCAÇÕES MENSAIS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAllocation {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Sempre o primeiro dia do mês
    pub month: NaiveDate,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// O valor pode chegar como número ou como texto formatado ("1,250,000").
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn value(&self) -> f64 {
        match self {
            AmountInput::Number(n) if n.is_finite() => *n,
            AmountInput::Number(_) => 0.0,
            AmountInput::Text(raw) => parse_formatted_number(raw),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInput {
    #[schema(value_type = String, example = "2025-07")]
    pub month: Month,
    #[schema(value_type = String, example = "1,250,000")]
    pub amount: AmountInput,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAllocationsPayload {
    pub view_mode: ViewModeKind,
    /// Obrigatório quando `viewMode` é FISCAL_YEAR
    #[validate(range(min = 1900, max = 9999, message = "fiscalYear must be between 1900 and 9999"))]
    #[schema(example = 2025)]
    pub fiscal_year: Option<i32>,
    pub allocations: Vec<AllocationInput>,
}

impl UpdateAllocationsPayload {
    pub fn view_mode(&self) -> Option<ViewMode> {
        match self.view_mode {
            ViewModeKind::FiscalYear => self.fiscal_year.map(ViewMode::FiscalYear),
            ViewModeKind::ProjectDuration => Some(ViewMode::ProjectDuration),
        }
    }
}
