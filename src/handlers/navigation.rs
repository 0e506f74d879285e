// src/handlers/navigation.rs

use axum::Json;
use serde_json::{json, Value};

use crate::{
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AnyRole, RequireRole},
    },
    models::navigation::navigation_for,
};

#[utoipa::path(
    get,
    path = "/api/navigation",
    tag = "Navigation",
    responses((status = 200, description = "Itens de menu visíveis para o cargo do usuário")),
    security(("api_jwt" = []))
)]
pub async fn get_navigation(
    _: RequireRole<AnyRole>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<Value> {
    Json(json!({
        "role": user.role,
        "items": navigation_for(user.role),
    }))
}
