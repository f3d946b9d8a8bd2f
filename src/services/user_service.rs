// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::UserStore,
    models::auth::{CreateUserPayload, NewUser, UpdateUserPayload, User, UserChanges, UserRole},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn list_active(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        self.users.list_active(role).await
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        let email = payload.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User with this email already exists".into()));
        }

        let user = self
            .users
            .create(NewUser {
                name: payload.name.trim().to_string(),
                email,
                password_hash: hash_password(&payload.password).await?,
                role: payload.role,
                is_active: true,
            })
            .await?;

        tracing::info!("Created user {} ({})", user.email, user.role);
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateUserPayload) -> Result<User, AppError> {
        let password_hash = match payload.password.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => {
                crate::models::auth::validate_password_strength(p).map_err(|e| {
                    let mut errs = validator::ValidationErrors::new();
                    errs.add("password", e);
                    AppError::ValidationError(errs)
                })?;
                Some(hash_password(p).await?)
            }
            _ => None,
        };

        let changes = UserChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            email: payload.email.map(|e| e.trim().to_lowercase()),
            role: payload.role,
            is_active: payload.is_active,
            password_hash,
        };

        let user = self
            .users
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        tracing::info!("Updated user {}", user.id);
        Ok(user)
    }

    /// Creates the user unless the email is already registered.
    pub async fn ensure(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Option<User>, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Ok(None);
        }
        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                email: email.to_lowercase(),
                password_hash: hash_password(password).await?,
                role,
                is_active: true,
            })
            .await?;
        Ok(Some(user))
    }
}
