// Testes contra um Postgres real. Rodar com:
//   DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use forecast_backend::{
    common::error::AppError,
    db::{
        user_repo::NewUser, AuditRepository, ForecastRepository, PeriodRepository,
        ProjectRepository, ReportRepository, UserRepository,
    },
    models::{
        audit::{AuditContext, NewAuditLog},
        forecast::Forecast,
        period::{ForecastPeriod, PeriodStatus},
        project::{CreateProjectPayload, ProjectType},
        user::{MarketSegment, Role, User},
    },
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_user(pool: &PgPool, email: &str) -> User {
    UserRepository::new(pool.clone())
        .create(
            pool,
            NewUser {
                email,
                password_hash: "$2b$04$not-a-real-hash",
                first_name: "Ana",
                last_name: "Lima",
                role: Role::Contributor,
                market_segments: &[MarketSegment::Energy, MarketSegment::Residential],
            },
        )
        .await
        .unwrap()
}

async fn seed_period(pool: &PgPool) -> ForecastPeriod {
    PeriodRepository::new(pool.clone())
        .create(
            pool,
            "FY2025 Q3",
            date(2025, 7, 1),
            date(2025, 9, 30),
            date(2025, 9, 15),
            PeriodStatus::Active,
        )
        .await
        .unwrap()
}

async fn seed_forecast(pool: &PgPool, user: &User, period: &ForecastPeriod) -> Forecast {
    ForecastRepository::new(pool.clone())
        .create(pool, user.id, period.id, MarketSegment::Energy)
        .await
        .unwrap()
}

async fn count(pool: &PgPool, sql: &str, id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(sql).bind(id).fetch_one(pool).await.unwrap()
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn deleting_a_period_removes_forecasts_projects_and_reports(pool: PgPool) {
    let user = seed_user(&pool, "ana@empresa.com").await;
    let period = seed_period(&pool).await;
    let forecast = seed_forecast(&pool, &user, &period).await;

    let projects = ProjectRepository::new(pool.clone());
    let project = projects
        .create(
            &pool,
            &CreateProjectPayload {
                forecast_id: forecast.id,
                name: "Subestação Norte".into(),
                project_type: ProjectType::Backlog,
                estimated_value: Decimal::new(1_250_000, 0),
                probability: 60,
                expected_close_date: date(2025, 12, 31),
                start_date: Some(date(2025, 8, 1)),
                client_name: None,
                description: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    projects
        .upsert_allocation(&pool, project.id, date(2025, 8, 1), Decimal::new(100_000, 0))
        .await
        .unwrap();

    ReportRepository::new(pool.clone())
        .create(&pool, period.id, "PERIOD_SUMMARY", &json!({}), user.id)
        .await
        .unwrap();

    let periods = PeriodRepository::new(pool.clone());
    assert!(periods.delete(&pool, period.id).await.unwrap());

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM forecasts WHERE period_id = $1", period.id).await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM projects WHERE forecast_id = $1", forecast.id).await, 0);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM project_allocations WHERE project_id = $1", project.id).await,
        0
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM reports WHERE period_id = $1", period.id).await, 0);
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn deleting_a_user_removes_forecasts_and_keeps_anonymous_audit_rows(pool: PgPool) {
    let user = seed_user(&pool, "bruno@empresa.com").await;
    let period = seed_period(&pool).await;
    let forecast = seed_forecast(&pool, &user, &period).await;

    let ctx = AuditContext {
        user_id: user.id,
        ip_address: Some("10.0.0.1".into()),
        user_agent: None,
    };
    AuditRepository::new(pool.clone())
        .record(&pool, &ctx, NewAuditLog::new("FORECAST_CREATED", "forecast", forecast.id))
        .await
        .unwrap();

    let users = UserRepository::new(pool.clone());
    assert!(users.delete(&pool, user.id).await.unwrap());

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM forecasts WHERE user_id = $1", user.id).await, 0);
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM audit_logs WHERE resource_id = $1 AND user_id IS NULL",
            forecast.id
        )
        .await,
        1
    );
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn second_forecast_for_same_segment_is_a_duplicate(pool: PgPool) {
    let user = seed_user(&pool, "carla@empresa.com").await;
    let period = seed_period(&pool).await;
    seed_forecast(&pool, &user, &period).await;

    let err = ForecastRepository::new(pool.clone())
        .create(&pool, user.id, period.id, MarketSegment::Energy)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "DUPLICATE_FIELD");
    assert_eq!(err.status().as_u16(), 400);
    assert!(matches!(err, AppError::DuplicateField(field) if field.contains("marketSegment")));

    // Outro segmento no mesmo período é permitido
    ForecastRepository::new(pool.clone())
        .create(&pool, user.id, period.id, MarketSegment::Residential)
        .await
        .unwrap();
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn duplicate_email_is_reported_by_field(pool: PgPool) {
    seed_user(&pool, "dani@empresa.com").await;

    let err = UserRepository::new(pool.clone())
        .create(
            &pool,
            NewUser {
                email: "dani@empresa.com",
                password_hash: "x",
                first_name: "Dani",
                last_name: "Reis",
                role: Role::Executive,
                market_segments: &[],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateField(field) if field == "email"));
}
