// src/models/report.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{forecast::ForecastStatus, project::ProjectType, user::MarketSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    PeriodSummary,
    SegmentBreakdown,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::PeriodSummary => "PERIOD_SUMMARY",
            ReportType::SegmentBreakdown => "SEGMENT_BREAKDOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub period_id: Uuid,
    #[schema(example = "PERIOD_SUMMARY")]
    pub report_type: String,
    /// Conteúdo opaco gerado pelo serviço de relatórios
    #[schema(value_type = Object)]
    pub data: Value,
    pub generated_by: Option<Uuid>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportPayload {
    pub period_id: Uuid,
    pub report_type: ReportType,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    pub period_id: Option<Uuid>,
}

/// Uma linha por projeto (ou uma linha sem projeto para forecasts vazios).
#[derive(Debug, Clone, FromRow)]
pub struct ReportSourceRow {
    pub forecast_id: Uuid,
    pub market_segment: MarketSegment,
    pub forecast_status: ForecastStatus,
    pub project_type: Option<ProjectType>,
    pub estimated_value: Option<Decimal>,
    pub probability: Option<i32>,
}
