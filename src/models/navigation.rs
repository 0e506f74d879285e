// src/models/navigation.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::user::Role;

const EVERYONE: &[Role] = &Role::ALL;
const MANAGERS: &[Role] = &[Role::Admin, Role::Executive, Role::VpDirector];
const ADMINS: &[Role] = &[Role::Admin];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NavItem {
    #[schema(example = "forecasts")]
    pub key: &'static str,
    #[schema(example = "Forecasts")]
    pub label: &'static str,
    #[schema(example = "/forecasts")]
    pub path: &'static str,
    #[serde(skip)]
    #[schema(ignore)]
    pub roles: &'static [Role],
}

pub const NAVIGATION: &[NavItem] = &[
    NavItem { key: "dashboard", label: "Dashboard", path: "/", roles: EVERYONE },
    NavItem { key: "forecasts", label: "Forecasts", path: "/forecasts", roles: EVERYONE },
    NavItem { key: "projects", label: "Projects", path: "/projects", roles: EVERYONE },
    NavItem { key: "periods", label: "Periods", path: "/periods", roles: MANAGERS },
    NavItem { key: "reports", label: "Reports", path: "/reports", roles: MANAGERS },
    NavItem { key: "users", label: "Users", path: "/users", roles: MANAGERS },
    NavItem { key: "settings", label: "Settings", path: "/settings", roles: ADMINS },
    NavItem { key: "audit", label: "Audit Log", path: "/audit-logs", roles: ADMINS },
];

pub fn navigation_for(role: Role) -> Vec<&'static NavItem> {
    NAVIGATION.iter().filter(|item| item.roles.contains(&role)).collect()
}
