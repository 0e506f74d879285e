pub mod audit;
pub mod forecast;
pub mod navigation;
pub mod period;
pub mod project;
pub mod report;
pub mod system_config;
pub mod user;
