//! Credential store: salted one-way hashing and username/password lookup.
//! Passwords are never stored or compared in clear text.

pub mod handlers;

use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;

pub const ROLE_CANDIDATE: &str = "candidate";
pub const ROLE_ADMIN: &str = "admin";

fn hash_password(password: &str) -> Result<String, AppError> {
    let hashed =
        bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;
    Ok(hashed)
}

fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}

/// Registers a new user, returning the durable id that keys profiles and
/// interview records.
pub async fn register(
    pool: &PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> Result<Uuid, AppError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required.".to_string(),
        ));
    }
    if role != ROLE_CANDIDATE && role != ROLE_ADMIN {
        return Err(AppError::Validation(format!(
            "Role must be '{ROLE_CANDIDATE}' or '{ROLE_ADMIN}'."
        )));
    }

    let id = Uuid::new_v4();
    let password_hash = hash_password(password)?;

    sqlx::query("INSERT INTO users (id, username, password_hash, role) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(username)
        .bind(&password_hash)
        .bind(role)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(d) if d.is_unique_violation() => {
                AppError::Conflict("Username already taken".to_string())
            }
            _ => AppError::Database(e),
        })?;

    Ok(id)
}

/// Verifies a username/password pair against the stored hash.
/// Returns `None` for both unknown users and wrong passwords.
pub async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<Option<(Uuid, String)>, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user
        .filter(|u| verify_password(password, &u.password_hash))
        .map(|u| (u.id, u.role)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hashed = hash_password("s3cret").unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(verify_password("s3cret", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn test_verify_against_garbage_hash_is_false() {
        assert!(!verify_password("s3cret", "not-a-bcrypt-hash"));
    }
}
