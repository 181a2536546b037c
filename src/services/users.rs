//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{BulkUserIds, CreateUser, UpdateUser, User, UserClaims, UserQuery},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password, returning a JWT and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is inactive".to_string()));
        }

        if !Self::verify_password(&user.password_hash, password) {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        self.repository.users.touch_last_login(user.id).await?;

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Hash a password with argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(hash: &str, password: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Search users
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Create a user
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = Self::hash_password(&user.password)?;
        self.repository
            .users
            .create(
                &user.username,
                &password_hash,
                user.email.as_deref(),
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                user.role.unwrap_or(Role::Member),
                user.is_active.unwrap_or(true),
            )
            .await
    }

    /// Update a user
    pub async fn update_user(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = match user.password.as_deref() {
            Some(password) => Some(Self::hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(
                id,
                user.username.as_deref(),
                password_hash.as_deref(),
                user.email.as_deref(),
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                user.role,
                user.is_active,
            )
            .await
    }

    /// Activate users in bulk; returns the number updated
    pub async fn activate_users(&self, payload: BulkUserIds) -> AppResult<u64> {
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.users.activate(&payload.ids).await
    }

    /// Deactivate users in bulk, never the caller's own account.
    /// Returns (updated, skipped).
    pub async fn deactivate_users(
        &self,
        payload: BulkUserIds,
        caller_id: i32,
    ) -> AppResult<(u64, u64)> {
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository
            .users
            .deactivate(&payload.ids, caller_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashes_verify() {
        let hash = UsersService::hash_password("correct horse").unwrap();
        assert!(UsersService::verify_password(&hash, "correct horse"));
        assert!(!UsersService::verify_password(&hash, "wrong horse"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!UsersService::verify_password("not-a-hash", "anything"));
    }
}
