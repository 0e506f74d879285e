// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Periods ---
        handlers::periods::list_periods,
        handlers::periods::get_period,
        handlers::periods::create_period,
        handlers::periods::update_period,
        handlers::periods::lock_period,
        handlers::periods::unlock_period,
        handlers::periods::delete_period,

        // --- Forecasts ---
        handlers::forecasts::list_forecasts,
        handlers::forecasts::get_forecast,
        handlers::forecasts::create_forecast,
        handlers::forecasts::delete_forecast,
        handlers::forecasts::submit_forecast,
        handlers::forecasts::approve_forecast,
        handlers::forecasts::reject_forecast,

        // --- Projects ---
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::get_allocations,
        handlers::projects::update_allocations,

        // --- Reports ---
        handlers::reports::list_reports,
        handlers::reports::get_report,
        handlers::reports::generate_report,
        handlers::reports::delete_report,

        // --- Settings ---
        handlers::settings::list_settings,
        handlers::settings::upsert_setting,
        handlers::settings::delete_setting,

        // --- Audit / Navigation ---
        handlers::audit::list_audit_logs,
        handlers::navigation::get_navigation,
    ),
    components(
        schemas(
            // --- Users ---
            models::user::Role,
            models::user::MarketSegment,
            models::user::User,
            models::user::LoginPayload,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,
            models::user::AuthResponse,

            // --- Periods ---
            models::period::PeriodStatus,
            models::period::ForecastPeriod,
            models::period::CreatePeriodPayload,
            models::period::UpdatePeriodPayload,

            // --- Forecasts ---
            models::forecast::ForecastStatus,
            models::forecast::Forecast,
            models::forecast::CreateForecastPayload,
            models::forecast::RejectForecastPayload,

            // --- Projects ---
            models::project::ProjectType,
            models::project::Project,
            models::project::CreateProjectPayload,
            models::project::UpdateProjectPayload,
            models::project::ProjectAllocation,
            models::project::AllocationInput,
            models::project::UpdateAllocationsPayload,
            crate::allocation::editor::ViewModeKind,

            // --- Reports ---
            models::report::ReportType,
            models::report::Report,
            models::report::GenerateReportPayload,

            // --- Admin ---
            models::system_config::SystemConfig,
            models::system_config::UpsertConfigPayload,
            models::audit::AuditLog,
            models::navigation::NavItem,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Users", description = "Gestão de Usuários e Cargos"),
        (name = "Periods", description = "Períodos de Forecast"),
        (name = "Forecasts", description = "Forecasts por Segmento e Fluxo de Aprovação"),
        (name = "Projects", description = "Projetos e Alocações Mensais"),
        (name = "Reports", description = "Relatórios Consolidados"),
        (name = "Settings", description = "Configurações do Sistema"),
        (name = "Audit", description = "Trilha de Auditoria"),
        (name = "Navigation", description = "Menu por Cargo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_guarded_routes_with_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/projects/{id}/allocations"));
        assert!(doc.paths.paths.contains_key("/api/settings/{key}"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
