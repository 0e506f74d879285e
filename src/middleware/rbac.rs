// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::user::Role};

/// 1. O Trait que define quais cargos podem executar uma operação
pub trait RolePolicy: Send + Sync + 'static {
    const ALLOWED: &'static [Role];

    fn allows(role: Role) -> bool {
        Self::ALLOWED.contains(&role)
    }
}

/// 2. O Extractor (Guardião). Deve vir antes dos extratores que tocam no banco.
pub struct RequireRole<P>(pub PhantomData<P>);

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        if !P::allows(user.role) {
            tracing::warn!(
                user_id = %user.id,
                role = %user.role,
                path = %parts.uri.path(),
                "acesso negado pelo controle de cargos"
            );
            return Err(AppError::Forbidden(user.role));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS POLÍTICAS (TIPOS)
// ---

pub struct AdminOnly;
impl RolePolicy for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

pub struct Leadership;
impl RolePolicy for Leadership {
    const ALLOWED: &'static [Role] = &[Role::Admin, Role::Executive];
}

pub struct Managers;
impl RolePolicy for Managers {
    const ALLOWED: &'static [Role] = &[Role::Admin, Role::Executive, Role::VpDirector];
}

pub struct AnyRole;
impl RolePolicy for AnyRole {
    const ALLOWED: &'static [Role] = &Role::ALL;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table() {
        assert!(AdminOnly::allows(Role::Admin));
        assert!(!AdminOnly::allows(Role::Executive));

        assert!(Leadership::allows(Role::Executive));
        assert!(!Leadership::allows(Role::VpDirector));

        assert!(Managers::allows(Role::VpDirector));
        assert!(!Managers::allows(Role::Contributor));

        assert!(Role::ALL.iter().all(|r| AnyRole::allows(*r)));
    }
}
