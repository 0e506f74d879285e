pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod config_repo;
pub use config_repo::SystemConfigRepository;
pub mod forecast_repo;
pub use forecast_repo::ForecastRepository;
pub mod period_repo;
pub use period_repo::PeriodRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
