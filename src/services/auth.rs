// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::user::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl: chrono::Duration) -> Self {
        Self { user_repo, jwt_secret, token_ttl }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        // Conta desativada não entra, mas sem revelar que ela existe
        if !user.is_active {
            tracing::warn!(user_id = %user.id, "tentativa de login em conta desativada");
            return Err(AppError::InvalidCredentials);
        }

        self.user_repo.touch_last_login(user.id).await?;
        tracing::info!(user_id = %user.id, "login realizado");

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Decodifica e valida o JWT sem tocar no banco.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_claims(token)?;

        // Usuário removido ou desativado invalida o token
        match self.user_repo.find_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::InvalidToken),
        }
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha ao assinar o JWT: {e}")))
    }
}

// Executa o hash em um thread separado
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{MarketSegment, Role};
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn service(ttl: chrono::Duration) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://forecast@127.0.0.1:1/unused")
            .unwrap();
        AuthService::new(UserRepository::new(pool), "test-secret".into(), ttl)
    }

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "vp@empresa.com".into(),
            password_hash: String::new(),
            first_name: "Vera".into(),
            last_name: "Pires".into(),
            role,
            market_segments: vec![MarketSegment::Energy],
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn token_round_trip_keeps_subject_and_role() {
        let svc = service(chrono::Duration::hours(1));
        let u = user(Role::VpDirector);

        let token = svc.create_token(&u).unwrap();
        let claims = svc.decode_claims(&token).unwrap();

        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.role, Role::VpDirector);
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let svc = service(chrono::Duration::hours(-2));
        let token = svc.create_token(&user(Role::Contributor)).unwrap();

        assert!(matches!(svc.decode_claims(&token), Err(AppError::TokenExpired)));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_invalid() {
        let svc = service(chrono::Duration::hours(1));
        let other = AuthService::new(
            svc.user_repo.clone(),
            "another-secret".into(),
            chrono::Duration::hours(1),
        );
        let token = other.create_token(&user(Role::Admin)).unwrap();

        assert!(matches!(svc.decode_claims(&token), Err(AppError::InvalidToken)));
        assert!(matches!(svc.decode_claims("not.a.jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_and_verify() {
        let hashed = hash_password("s3cret-pass").await.unwrap();
        assert!(verify_password("s3cret-pass", &hashed).await.unwrap());
        assert!(!verify_password("wrong-pass", &hashed).await.unwrap());
    }
}
