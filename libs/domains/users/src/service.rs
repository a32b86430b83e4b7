use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::TokenVerifier;
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{
    AuthResponse, ExtensionStatus, LoginRequest, RegisterRequest, User, UserProfile,
    normalize_email,
};
use crate::repository::UserRepository;

pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    tokens: Arc<TokenVerifier>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>, tokens: Arc<TokenVerifier>) -> Self {
        Self { repository, tokens }
    }

    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);
        if self.repository.get_by_email(&email).await?.is_some() {
            return Err(UserError::DuplicateEmail);
        }

        let full_name = input
            .full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let hash = hash_password(&input.password)?;
        let user = self.repository.create(User::new(email, hash, full_name)).await?;

        self.respond(user)
    }

    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);
        let user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        self.respond(user)
    }

    pub async fn profile(&self, user_id: &str) -> UserResult<UserProfile> {
        self.repository
            .get_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }

    pub async fn extension_status(&self, user_id: &str) -> UserResult<ExtensionStatus> {
        let user = self.repository.get_by_id(user_id).await?;
        Ok(ExtensionStatus {
            authenticated: true,
            user: user.map(UserProfile::from),
        })
    }

    fn respond(&self, user: User) -> UserResult<AuthResponse> {
        let token = self.tokens.issue(&user.id, Some(&user.email))?;
        Ok(AuthResponse::bearer(token, user))
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
