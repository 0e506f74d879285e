// src/services/report_service.rs

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::snapshot, error::AppError},
    db::{AuditRepository, PeriodRepository, ReportRepository},
    models::{
        audit::{AuditContext, NewAuditLog},
        period::ForecastPeriod,
        report::{GenerateReportPayload, Report, ReportSourceRow, ReportType},
    },
};

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub forecast_count: usize,
    pub project_count: usize,
    pub total_value: Decimal,
    pub weighted_value: Decimal,
}

#[derive(Default)]
struct Accumulator {
    forecasts: HashSet<Uuid>,
    totals: Totals,
}

impl Accumulator {
    fn add(&mut self, row: &ReportSourceRow) {
        if self.forecasts.insert(row.forecast_id) {
            self.totals.forecast_count += 1;
        }
        if let (Some(value), Some(probability)) = (row.estimated_value, row.probability) {
            self.totals.project_count += 1;
            self.totals.total_value += value;
            self.totals.weighted_value += (value * Decimal::from(probability) / Decimal::from(100)).round_dp(2);
        }
    }
}

fn grouped<K, F>(rows: &[ReportSourceRow], key: F) -> BTreeMap<String, Totals>
where
    K: Serialize,
    F: Fn(&ReportSourceRow) -> Option<K>,
{
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for row in rows {
        if let Some(k) = key(row) {
            let name = serde_json::to_value(&k)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            groups.entry(name).or_default().add(row);
        }
    }
    groups.into_iter().map(|(k, acc)| (k, acc.totals)).collect()
}

/// Monta o conteúdo do relatório a partir das linhas forecast x projeto.
pub fn summarize(period: &ForecastPeriod, report_type: ReportType, rows: &[ReportSourceRow]) -> Value {
    let mut overall = Accumulator::default();
    for row in rows {
        overall.add(row);
    }

    let mut data = json!({
        "period": {
            "id": period.id,
            "name": period.name,
            "startDate": period.start_date,
            "endDate": period.end_date,
            "status": period.status,
            "isLocked": period.is_locked,
        },
        "totals": overall.totals,
        "bySegment": grouped(rows, |r| Some(r.market_segment)),
    });

    if report_type == ReportType::PeriodSummary {
        data["byStatus"] = json!(grouped(rows, |r| Some(r.forecast_status)));
        data["byProjectType"] = json!(grouped(rows, |r| r.project_type));
    }

    data
}

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
    period_repo: PeriodRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl ReportService {
    pub fn new(
        repo: ReportRepository,
        period_repo: PeriodRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, period_repo, audit_repo, pool }
    }

    pub async fn list(&self, period_id: Option<Uuid>) -> Result<Vec<Report>, AppError> {
        self.repo.list(period_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Report, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report".into()))
    }

    pub async fn generate(
        &self,
        payload: GenerateReportPayload,
        audit: &AuditContext,
    ) -> Result<Report, AppError> {
        let period = self
            .period_repo
            .find_by_id(payload.period_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Forecast period".into()))?;

        let started = Utc::now();
        let rows = self.repo.source_rows(period.id).await?;
        let data = summarize(&period, payload.report_type, &rows);

        let mut tx = self.pool.begin().await?;

        let report = self
            .repo
            .create(&mut *tx, period.id, payload.report_type.as_str(), &data, audit.user_id)
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("REPORT_GENERATED", "report", report.id).new_values(Some(json!({
                    "periodId": period.id,
                    "reportType": report.report_type,
                }))),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            report_id = %report.id,
            period_id = %period.id,
            rows = rows.len(),
            elapsed_ms = (Utc::now() - started).num_milliseconds(),
            "relatório gerado"
        );
        Ok(report)
    }

    pub async fn delete(&self, id: Uuid, audit: &AuditContext) -> Result<(), AppError> {
        let before = self.get(id).await?;

        let mut tx = self.pool.begin().await?;

        if !self.repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("Report".into()));
        }

        self.audit_repo
            .record(
                &mut *tx,
                audit,
                NewAuditLog::new("REPORT_DELETED", "report", id).old(snapshot(&before)),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        forecast::ForecastStatus,
        period::PeriodStatus,
        project::ProjectType,
        user::MarketSegment,
    };
    use chrono::NaiveDate;

    fn period() -> ForecastPeriod {
        ForecastPeriod {
            id: Uuid::new_v4(),
            name: "FY2025 Q1".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            submission_deadline: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            status: PeriodStatus::Active,
            is_locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn row(
        forecast_id: Uuid,
        segment: MarketSegment,
        status: ForecastStatus,
        project: Option<(ProjectType, i64, i32)>,
    ) -> ReportSourceRow {
        ReportSourceRow {
            forecast_id,
            market_segment: segment,
            forecast_status: status,
            project_type: project.map(|p| p.0),
            estimated_value: project.map(|p| Decimal::from(p.1)),
            probability: project.map(|p| p.2),
        }
    }

    #[test]
    fn summary_aggregates_value_and_weighted_value() {
        let energy = Uuid::new_v4();
        let residential = Uuid::new_v4();
        let rows = vec![
            row(energy, MarketSegment::Energy, ForecastStatus::Submitted, Some((ProjectType::Backlog, 1_000_000, 50))),
            row(energy, MarketSegment::Energy, ForecastStatus::Submitted, Some((ProjectType::Swag, 200_000, 25))),
            // forecast sem projetos
            row(residential, MarketSegment::Residential, ForecastStatus::Draft, None),
        ];

        let data = summarize(&period(), ReportType::PeriodSummary, &rows);

        assert_eq!(data["totals"]["forecastCount"], 2);
        assert_eq!(data["totals"]["projectCount"], 2);
        assert_eq!(data["totals"]["totalValue"], 1_200_000.0);
        assert_eq!(data["totals"]["weightedValue"], 550_000.0);

        assert_eq!(data["bySegment"]["ENERGY"]["projectCount"], 2);
        assert_eq!(data["bySegment"]["RESIDENTIAL"]["forecastCount"], 1);
        assert_eq!(data["bySegment"]["RESIDENTIAL"]["projectCount"], 0);
        assert_eq!(data["byStatus"]["SUBMITTED"]["forecastCount"], 1);
        assert_eq!(data["byProjectType"]["SWAG"]["totalValue"], 200_000.0);
    }

    #[test]
    fn segment_breakdown_omits_status_sections() {
        let data = summarize(&period(), ReportType::SegmentBreakdown, &[]);
        assert_eq!(data["totals"]["forecastCount"], 0);
        assert!(data.get("byStatus").is_none());
        assert_eq!(data["period"]["name"], "FY2025 Q1");
    }
}
