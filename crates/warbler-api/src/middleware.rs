use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use warbler_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "warbler_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Who is making this request. Extracted once per request from the session
/// cookie (or a Bearer token) and handed to handlers explicitly.
///
/// The request's cookies ride along so that a refusal appends its flash to
/// the ones already pending instead of replacing them.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<CurrentUser>,
    jar: CookieJar,
}

impl AuthContext {
    pub fn anonymous(jar: CookieJar) -> Self {
        Self { user: None, jar }
    }

    pub fn authenticated(user: CurrentUser, jar: CookieJar) -> Self {
        Self {
            user: Some(user),
            jar,
        }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Gate for endpoints that need any logged-in user.
    pub fn require(&self) -> Result<&CurrentUser, ApiError> {
        self.user.as_ref().ok_or_else(|| self.refuse())
    }

    /// Gate for endpoints that only the user `user_id` may see.
    pub fn require_user(&self, user_id: i64) -> Result<&CurrentUser, ApiError> {
        match self.require()? {
            u if u.id == user_id => Ok(u),
            _ => Err(self.refuse()),
        }
    }

    /// The uniform "Access unauthorized" refusal for this request.
    pub fn refuse(&self) -> ApiError {
        ApiError::Unauthorized(self.jar.clone())
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = session_token(&jar, parts) else {
            return Ok(AuthContext::anonymous(jar));
        };

        let claims = match decode_token(&state.session_secret, &token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Ignoring invalid session token: {}", e);
                return Ok(AuthContext::anonymous(jar));
            }
        };

        // The token outlives its user if the account was deleted.
        Ok(match state.db.get_user_by_id(claims.sub)? {
            Some(user) => AuthContext::authenticated(
                CurrentUser {
                    id: user.id,
                    username: user.username,
                },
                jar,
            ),
            None => AuthContext::anonymous(jar),
        })
    }
}

pub fn decode_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Session cookie first, then an `Authorization: Bearer` header.
fn session_token(jar: &CookieJar, parts: &Parts) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}
