pub mod auth;
pub mod forecast_service;
pub mod period_service;
pub mod project_service;
pub mod report_service;
pub mod user_service;
