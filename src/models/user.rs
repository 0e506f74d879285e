// src/models/user.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Executive,
    VpDirector,
    Contributor,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Executive, Role::VpDirector, Role::Contributor];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Executive => "EXECUTIVE",
            Role::VpDirector => "VP_DIRECTOR",
            Role::Contributor => "CONTRIBUTOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "market_segment", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketSegment {
    Environmental,
    Energy,
    PublicWorks,
    Residential,
}

impl MarketSegment {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketSegment::Environmental => "ENVIRONMENTAL",
            MarketSegment::Energy => "ENERGY",
            MarketSegment::PublicWorks => "PUBLIC_WORKS",
            MarketSegment::Residential => "RESIDENTIAL",
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "maria.souza@empresa.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Maria")]
    pub first_name: String,
    #[schema(example = "Souza")]
    pub last_name: String,

    pub role: Role,
    pub market_segments: Vec<MarketSegment>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn handles_segment(&self, segment: MarketSegment) -> bool {
        self.market_segments.contains(&segment)
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "A valid email is required"))]
    #[schema(example = "maria.souza@empresa.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    pub role: Role,

    #[serde(default)]
    pub market_segments: Vec<MarketSegment>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,

    pub role: Option<Role>,
    pub market_segments: Option<Vec<MarketSegment>>,
    pub is_active: Option<bool>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub role: Role,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_in_screaming_snake_case() {
        assert_eq!(serde_json::to_value(Role::VpDirector).unwrap(), "VP_DIRECTOR");
        let role: Role = serde_json::from_str("\"CONTRIBUTOR\"").unwrap();
        assert_eq!(role, Role::Contributor);
        assert_eq!(Role::Executive.to_string(), "EXECUTIVE");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            password_hash: "$2b$12$secret".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            role: Role::Contributor,
            market_segments: vec![MarketSegment::PublicWorks],
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["marketSegments"][0], "PUBLIC_WORKS");
        assert!(user.handles_segment(MarketSegment::PublicWorks));
        assert!(!user.handles_segment(MarketSegment::Energy));
    }
}
