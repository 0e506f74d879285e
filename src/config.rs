// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    db::{
        AuditRepository, ForecastRepository, PeriodRepository, ProjectRepository,
        ReportRepository, SystemConfigRepository, UserRepository,
    },
    services::{
        auth::AuthService, forecast_service::ForecastService, period_service::PeriodService,
        project_service::ProjectService, report_service::ReportService,
        user_service::UserService,
    },
};

/// Modo de execução. Controla a verbosidade dos erros devolvidos ao cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => RuntimeMode::Production,
            _ => RuntimeMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RuntimeMode::Production
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub runtime_mode: RuntimeMode,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_expiration_hours: i64,
    pub fiscal_year_start_month: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let runtime_mode = env::var("APP_ENV")
            .map(|v| RuntimeMode::from_env_value(&v))
            .unwrap_or(RuntimeMode::Development);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 5)?;
        let jwt_expiration_hours = parse_var("JWT_EXPIRATION_HOURS", 24)?;
        let fiscal_year_start_month = parse_var("FISCAL_YEAR_START_MONTH", 1)?;

        if !(1..=12).contains(&fiscal_year_start_month) {
            anyhow::bail!("FISCAL_YEAR_START_MONTH deve estar entre 1 e 12");
        }

        Ok(Self {
            database_url,
            jwt_secret,
            runtime_mode,
            bind_addr,
            db_max_connections,
            jwt_expiration_hours,
            fiscal_year_start_month,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} contém um valor inválido: {raw}")),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub period_service: PeriodService,
    pub forecast_service: ForecastService,
    pub project_service: ProjectService,
    pub report_service: ReportService,
    pub settings_repo: SystemConfigRepository,
    pub audit_repo: AuditRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_parts(config, db_pool))
    }

    /// Monta o gráfico de dependências a partir de uma configuração e de um pool já criados.
    pub fn from_parts(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let period_repo = PeriodRepository::new(db_pool.clone());
        let forecast_repo = ForecastRepository::new(db_pool.clone());
        let project_repo = ProjectRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let settings_repo = SystemConfigRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.jwt_expiration_hours),
        );
        let user_service = UserService::new(user_repo.clone(), audit_repo.clone(), db_pool.clone());
        let period_service =
            PeriodService::new(period_repo.clone(), audit_repo.clone(), db_pool.clone());
        let forecast_service = ForecastService::new(
            forecast_repo.clone(),
            period_repo.clone(),
            user_repo,
            audit_repo.clone(),
            db_pool.clone(),
        );
        let project_service = ProjectService::new(
            project_repo,
            forecast_repo.clone(),
            period_repo.clone(),
            audit_repo.clone(),
            db_pool.clone(),
            config.fiscal_year_start_month,
        );
        let report_service =
            ReportService::new(report_repo, period_repo, audit_repo.clone(), db_pool.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            user_service,
            period_service,
            forecast_service,
            project_service,
            report_service,
            settings_repo,
            audit_repo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_mode_is_recognised_case_insensitively() {
        assert_eq!(RuntimeMode::from_env_value("production"), RuntimeMode::Production);
        assert_eq!(RuntimeMode::from_env_value(" PRODUCTION "), RuntimeMode::Production);
        assert_eq!(RuntimeMode::from_env_value("development"), RuntimeMode::Development);
        assert_eq!(RuntimeMode::from_env_value("staging"), RuntimeMode::Development);
    }
}
