// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{auth::auth_guard, error_normalizer::normalize_errors},
};

/// Rotas protegidas, relativas a `/api`. A checagem de cargo fica em cada handler.
pub fn api_routes() -> Router<AppState> {
    use handlers::{audit, auth, forecasts, navigation, periods, projects, reports, settings, users};

    Router::new()
        .route("/auth/me", get(auth::get_me))
        // Usuários
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Períodos
        .route("/periods", get(periods::list_periods).post(periods::create_period))
        .route(
            "/periods/{id}",
            get(periods::get_period)
                .put(periods::update_period)
                .delete(periods::delete_period),
        )
        .route("/periods/{id}/lock", post(periods::lock_period))
        .route("/periods/{id}/unlock", post(periods::unlock_period))
        // Forecasts
        .route(
            "/forecasts",
            get(forecasts::list_forecasts).post(forecasts::create_forecast),
        )
        .route(
            "/forecasts/{id}",
            get(forecasts::get_forecast).delete(forecasts::delete_forecast),
        )
        .route("/forecasts/{id}/submit", post(forecasts::submit_forecast))
        .route("/forecasts/{id}/approve", post(forecasts::approve_forecast))
        .route("/forecasts/{id}/reject", post(forecasts::reject_forecast))
        // Projetos
        .route("/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/{id}/allocations",
            get(projects::get_allocations).put(projects::update_allocations),
        )
        // Relatórios
        .route("/reports", get(reports::list_reports).post(reports::generate_report))
        .route(
            "/reports/{id}",
            get(reports::get_report).delete(reports::delete_report),
        )
        // Administração
        .route("/settings", get(settings::list_settings))
        .route(
            "/settings/{key}",
            axum::routing::put(settings::upsert_setting).delete(settings::delete_setting),
        )
        .route("/audit-logs", get(audit::list_audit_logs))
        .route("/navigation", get(navigation::get_navigation))
}

pub fn build_router(app_state: AppState) -> Router {
    let protected = api_routes().layer(axum_middleware::from_fn_with_state(
        app_state.clone(),
        auth_guard,
    ));

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/login", post(handlers::auth::login))
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::route_not_found)
        // Mais externa: enxerga os erros de todas as camadas acima
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            normalize_errors,
        ))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, RuntimeMode},
        middleware::auth::AuthenticatedUser,
        models::user::{MarketSegment, Role, User},
    };
    use axum::Extension;
    use chrono::Utc;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use std::{net::SocketAddr, time::Duration};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use uuid::Uuid;

    fn state(mode: RuntimeMode) -> AppState {
        // Pool que nunca conecta: qualquer acesso ao banco vira 500
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://forecast@127.0.0.1:1/unused")
            .unwrap();

        let config = Config {
            database_url: "postgres://forecast@127.0.0.1:1/unused".into(),
            jwt_secret: "route-test-secret".into(),
            runtime_mode: mode,
            bind_addr: "127.0.0.1:0".into(),
            db_max_connections: 1,
            jwt_expiration_hours: 1,
            fiscal_year_start_month: 1,
        };
        AppState::from_parts(config, pool)
    }

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@empresa.com", role.as_str().to_lowercase()),
            password_hash: String::new(),
            first_name: "Teste".into(),
            last_name: "Silva".into(),
            role,
            market_segments: vec![MarketSegment::Energy],
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Router já autenticado como `role`, sem passar pelo auth_guard.
    fn as_role(role: Role, app_state: AppState) -> Router {
        Router::new()
            .nest(
                "/api",
                api_routes().layer(Extension(AuthenticatedUser(user(role)))),
            )
            .layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                normalize_errors,
            ))
            .with_state(app_state)
    }

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .unwrap();
        });
        addr
    }

    async fn send(
        addr: SocketAddr,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> (u16, Value) {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
        if let Some(payload) = body {
            req.push_str("Content-Type: application/json\r\n");
            req.push_str(&format!("Content-Length: {}\r\n", payload.len()));
        }
        for (k, v) in headers {
            req.push_str(&format!("{k}: {v}\r\n"));
        }
        req.push_str("\r\n");
        if let Some(payload) = body {
            req.push_str(payload);
        }
        stream.write_all(req.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap();
        (status, serde_json::from_str(body).unwrap_or(Value::Null))
    }

    fn code(body: &Value) -> &str {
        body["error"]["code"].as_str().unwrap_or_default()
    }

    #[tokio::test]
    async fn guarded_routes_reject_missing_or_bad_credentials() {
        let app_state = state(RuntimeMode::Production);
        let expired = {
            let svc = crate::services::auth::AuthService::new(
                crate::db::UserRepository::new(app_state.db_pool.clone()),
                app_state.config.jwt_secret.clone(),
                chrono::Duration::hours(-2),
            );
            svc.create_token(&user(Role::Admin)).unwrap()
        };
        let addr = serve(build_router(app_state)).await;

        let (status, body) = send(addr, "GET", "/api/users", &[], None).await;
        assert_eq!(status, 401);
        assert_eq!(code(&body), "INVALID_TOKEN");

        let (status, body) =
            send(addr, "GET", "/api/users", &[("Authorization", "Basic Zm9vOmJhcg==")], None).await;
        assert_eq!(status, 401);
        assert_eq!(code(&body), "INVALID_TOKEN");

        let (status, body) =
            send(addr, "GET", "/api/periods", &[("Authorization", "Bearer not-a-jwt")], None).await;
        assert_eq!(status, 401);
        assert_eq!(code(&body), "INVALID_TOKEN");

        let bearer = format!("Bearer {expired}");
        let (status, body) =
            send(addr, "DELETE", "/api/periods/00000000-0000-0000-0000-000000000000", &[("Authorization", &bearer)], None)
                .await;
        assert_eq!(status, 401);
        assert_eq!(code(&body), "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn roles_outside_the_route_policy_get_403() {
        let id = Uuid::new_v4();
        let cases = [
            (Role::Contributor, "DELETE", format!("/api/users/{id}")),
            (Role::Contributor, "GET", "/api/users".to_string()),
            (Role::Contributor, "GET", "/api/settings".to_string()),
            (Role::Contributor, "POST", format!("/api/forecasts/{id}/approve")),
            (Role::VpDirector, "DELETE", format!("/api/periods/{id}")),
            (Role::VpDirector, "POST", format!("/api/periods/{id}/lock")),
            (Role::Executive, "POST", format!("/api/periods/{id}/unlock")),
            (Role::Executive, "GET", "/api/audit-logs".to_string()),
        ];

        for (role, method, path) in cases {
            let addr = serve(as_role(role, state(RuntimeMode::Production))).await;
            let (status, body) = send(addr, method, &path, &[], None).await;
            assert_eq!(status, 403, "{role} {method} {path}");
            assert_eq!(code(&body), "FORBIDDEN");
        }
    }

    #[tokio::test]
    async fn contributor_cannot_create_periods_even_with_valid_body() {
        let addr = serve(as_role(Role::Contributor, state(RuntimeMode::Production))).await;
        let payload = r#"{"name":"Q1","startDate":"2025-01-01","endDate":"2025-03-31","submissionDeadline":"2025-03-20"}"#;

        let (status, body) = send(addr, "POST", "/api/periods", &[], Some(payload)).await;
        assert_eq!(status, 403);
        assert_eq!(code(&body), "FORBIDDEN");
    }

    #[tokio::test]
    async fn malformed_identifiers_are_validation_errors() {
        let addr = serve(as_role(Role::Admin, state(RuntimeMode::Production))).await;

        let (status, body) = send(addr, "GET", "/api/users/not-a-uuid", &[], None).await;
        assert_eq!(status, 400);
        assert_eq!(code(&body), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn navigation_is_served_without_touching_the_database() {
        let addr = serve(as_role(Role::Contributor, state(RuntimeMode::Production))).await;

        let (status, body) = send(addr, "GET", "/api/navigation", &[], None).await;
        assert_eq!(status, 200);
        assert_eq!(body["role"], "CONTRIBUTOR");
        assert_eq!(body["items"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn unknown_routes_are_normalized_404() {
        let addr = serve(build_router(state(RuntimeMode::Production))).await;

        let (status, body) = send(addr, "GET", "/nada/aqui", &[], None).await;
        assert_eq!(status, 404);
        assert_eq!(code(&body), "NOT_FOUND");

        let (status, _) = send(addr, "GET", "/api/health", &[], None).await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn wrong_verb_on_known_path_is_normalized_405() {
        let addr = serve(build_router(state(RuntimeMode::Production))).await;

        let (status, body) = send(addr, "GET", "/api/auth/login", &[], None).await;
        assert_eq!(status, 405);
        assert_eq!(code(&body), "CLIENT_ERROR");

        let (status, body) = send(addr, "DELETE", "/api/health", &[], None).await;
        assert_eq!(status, 405);
        assert!(body["error"]["message"].as_str().unwrap_or_default().contains("DELETE"));
    }

    #[tokio::test]
    async fn allocation_payload_errors_are_reported_before_the_database() {
        let addr = serve(as_role(Role::Contributor, state(RuntimeMode::Production))).await;
        let path = format!("/api/projects/{}/allocations", Uuid::new_v4());

        let cases = [
            // FISCAL_YEAR sem ano
            (r#"{"viewMode":"FISCAL_YEAR","allocations":[]}"#, "VALIDATION_ERROR"),
            // ano que estouraria a aritmética de meses
            (r#"{"viewMode":"FISCAL_YEAR","fiscalYear":2147483647,"allocations":[]}"#, "VALIDATION_ERROR"),
            (r#"{"viewMode":"FISCAL_YEAR","fiscalYear":-2147483648,"allocations":[]}"#, "VALIDATION_ERROR"),
            (r#"{"viewMode":"PROJECT_DURATION","allocations":[{"month":"300000-01","amount":1}]}"#, "VALIDATION_ERROR"),
            (r#"{"viewMode":"PROJECT_DURATION","allocations":[{"month":"2025-03","amount":1e13}]}"#, "VALIDATION_ERROR"),
            (r#"{"viewMode":"PROJECT_DURATION","allocations":[{"month":"2025-03","amount":-10}]}"#, "CLIENT_ERROR"),
        ];

        for (payload, expected) in cases {
            let (status, body) = send(addr, "PUT", &path, &[], Some(payload)).await;
            assert_eq!(status, 400, "{payload}");
            assert_eq!(code(&body), expected, "{payload}");
        }
    }

    #[tokio::test]
    async fn project_payload_errors_are_reported_before_the_database() {
        let addr = serve(as_role(Role::Contributor, state(RuntimeMode::Production))).await;
        let forecast_id = Uuid::new_v4();

        let too_large = format!(
            r#"{{"forecastId":"{forecast_id}","name":"Usina","projectType":"BACKLOG","estimatedValue":100000000000000000,"probability":50,"expectedCloseDate":"2025-12-31"}}"#
        );
        let inverted = format!(
            r#"{{"forecastId":"{forecast_id}","name":"Usina","projectType":"BACKLOG","estimatedValue":1000,"probability":50,"expectedCloseDate":"2025-06-30","startDate":"2025-09-01"}}"#
        );

        for payload in [too_large, inverted] {
            let (status, body) = send(addr, "POST", "/api/projects", &[], Some(payload.as_str())).await;
            assert_eq!(status, 400, "{payload}");
            assert_eq!(code(&body), "VALIDATION_ERROR", "{payload}");
        }
    }

    #[tokio::test]
    async fn server_errors_hide_details_in_production() {
        let addr = serve(as_role(Role::Admin, state(RuntimeMode::Production))).await;

        let (status, body) = send(addr, "GET", "/api/periods", &[], None).await;
        assert_eq!(status, 500);
        assert_eq!(code(&body), "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
        assert!(body["error"].get("stack").is_none());
    }

    #[tokio::test]
    async fn server_errors_carry_stack_in_development() {
        let addr = serve(as_role(Role::Admin, state(RuntimeMode::Development))).await;

        let (status, body) = send(addr, "GET", "/api/periods", &[], None).await;
        assert_eq!(status, 500);
        assert_ne!(body["error"]["message"], "Internal server error");
        assert!(body["error"]["stack"].is_string());
    }
}
