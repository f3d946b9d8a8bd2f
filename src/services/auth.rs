// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::store::UserStore,
    models::auth::{AuthResponse, Claims, User},
};

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

/// Hashes on the blocking pool; bcrypt is CPU-bound.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, session_ttl: Duration) -> Self {
        Self {
            users,
            jwt_secret,
            session_ttl,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        tracing::info!("User {} logged in", user.email);
        Ok(AuthResponse { token, user })
    }

    /// Resolves a bearer token to a live, active user.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let user = self
            .users
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::auth::UserRole, test_support::TestApp};

    #[tokio::test]
    async fn login_issues_a_token_that_validates() {
        let app = TestApp::new().await;
        let res = app
            .state
            .auth_service
            .login("ADMIN@lindsay.com", "Admin123")
            .await
            .unwrap();
        assert_eq!(res.user.role, UserRole::Admin);

        let user = app.state.auth_service.validate_token(&res.token).await.unwrap();
        assert_eq!(user.id, app.admin.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_invalid_credentials() {
        let app = TestApp::new().await;
        let auth = &app.state.auth_service;
        assert!(matches!(
            auth.login("admin@lindsay.com", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost@lindsay.com", "Admin123").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn disabled_accounts_cannot_log_in_or_use_old_tokens() {
        let app = TestApp::new().await;
        let token = app.token_for(&app.viewer);
        app.deactivate(app.viewer.id).await;

        assert!(matches!(
            app.state.auth_service.login(&app.viewer.email, "Viewer123").await,
            Err(AppError::AccountDisabled)
        ));
        assert!(matches!(
            app.state.auth_service.validate_token(&token).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn garbage_tokens_are_unauthorized() {
        let app = TestApp::new().await;
        assert!(matches!(
            app.state.auth_service.validate_token("not-a-jwt").await,
            Err(AppError::Unauthorized)
        ));
    }
}
