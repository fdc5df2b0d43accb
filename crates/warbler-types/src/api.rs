use serde::{Deserialize, Serialize};

use crate::models::{Message, User, UserStats};

// -- Session --

/// Claims carried by the session token. `sub` is the logged-in user's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

/// Every field is optional on the wire so that a missing field reaches signup
/// validation instead of failing JSON decoding.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
    pub stats: UserStats,
    pub messages: Vec<Message>,
    /// Whether the session user follows this profile. Always false when
    /// anonymous.
    pub followed_by_viewer: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Current password, re-entered to confirm the edit.
    pub password: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMessageRequest {
    pub text: String,
}

// -- Home --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub flashes: Vec<Flash>,
    pub user: Option<User>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_tolerates_missing_fields() {
        let req: SignupRequest = serde_json::from_str(r#"{"username":"testtest"}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some("testtest"));
        assert!(req.password.is_none());
        assert!(req.email.is_none());
    }

    #[test]
    fn signup_request_rejects_unknown_fields() {
        let res: Result<SignupRequest, _> =
            serde_json::from_str(r#"{"username":"a","is_admin":true}"#);
        assert!(res.is_err());
    }
}
