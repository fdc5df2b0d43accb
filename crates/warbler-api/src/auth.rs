use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;

use warbler_db::models::UserRow;
use warbler_db::{Database, DbError};
use warbler_types::api::{Claims, LoginRequest, SignupRequest};

use crate::credentials;
use crate::error::ApiError;
use crate::flash;
use crate::middleware::SESSION_COOKIE;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pending = credentials::signup(
        req.username.as_deref(),
        req.email.as_deref(),
        req.password.as_deref(),
        req.image_url.as_deref(),
    )?;

    let user = state.db.insert_user(&pending).map_err(|e| match e {
        DbError::Conflict(_) => ApiError::Conflict("Username or email already taken".into()),
        other => other.into(),
    })?;

    info!("New user {} (#{}) signed up", user.username, user.id);

    let jar = log_in(&state, jar, &user)?;
    Ok((jar, Redirect::to("/")))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = credentials::authenticate(&state.db, &req.username, &req.password)?
        .ok_or(ApiError::InvalidCredentials)?;

    let jar = log_in(&state, jar, &user)?;
    let jar = flash::push(jar, flash::SUCCESS, format!("Hello, {}!", user.username));
    Ok((jar, Redirect::to("/")))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = log_out(jar);
    let jar = flash::push(jar, flash::SUCCESS, "You have been logged out.");
    (jar, Redirect::to("/"))
}

/// Anonymous -> Authenticated: issues a session token for `user`.
pub fn log_in(state: &AppState, jar: CookieJar, user: &UserRow) -> Result<CookieJar, ApiError> {
    let token = create_token(&state.session_secret, user.id, &user.username)
        .map_err(|e| ApiError::Internal(format!("session token: {e}")))?;

    Ok(jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    ))
}

/// Authenticated -> Anonymous.
pub fn log_out(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

pub fn create_token(secret: &str, user_id: i64, username: &str) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::decode_token;

    #[test]
    fn token_round_trips_user_id() {
        let token = create_token("secret", 111, "test1").unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, 111);
        assert_eq!(claims.username, "test1");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token("secret", 111, "test1").unwrap();
        assert!(decode_token("other-secret", &token).is_err());
    }
}
