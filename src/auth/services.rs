use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{LoginForm, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password_blocking, verify_against_dummy, verify_password_blocking},
    repo::UserRepository,
    repo_types::{NewUser, User},
};
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Creates an active user with role "user". Only the Argon2 hash of the
/// password is stored.
pub async fn register(users: &dyn UserRepository, req: RegisterRequest) -> Result<User, AppError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let hashed_password = hash_password_blocking(req.password).await?;
    let user = users
        .create(NewUser {
            username,
            email,
            hashed_password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Verifies credentials and issues an access token. Unknown user and wrong
/// password produce the same error after the same amount of hashing work.
pub async fn login(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    form: LoginForm,
) -> Result<String, AppError> {
    let username = form.username.trim();
    let Some(user) = users.find_by_username(username).await? else {
        verify_against_dummy(form.password).await?;
        warn!(%username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(form.password, user.hashed_password.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.issue_access(user.id, &user.username)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
