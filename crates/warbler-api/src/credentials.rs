use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use thiserror::Error;

use warbler_db::models::{NewUser, UserRow};
use warbler_db::{Database, Result as DbResult};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Validates signup fields and hashes the password. The returned user is not
/// written; uniqueness is only checked once the caller inserts it.
pub fn signup(
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
    image_url: Option<&str>,
) -> Result<NewUser, CredentialError> {
    let username = required("username", username)?;
    let email = required("email", email)?;
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(CredentialError::Missing("password"))?;

    Ok(NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        image_url: image_url.map(str::to_string),
    })
}

/// Returns the user only when it exists and `password` matches its hash.
/// A wrong username and a wrong password look the same to the caller.
pub fn authenticate(db: &Database, username: &str, password: &str) -> DbResult<Option<UserRow>> {
    let user = db.get_user_by_username(username)?;
    Ok(user.filter(|u| verify_password(password, &u.password)))
}

/// Hash password with Argon2id
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, CredentialError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(CredentialError::Missing(field))
}
