//! One-shot notices carried between a redirecting handler and the next page
//! load. Stored client-side in a cookie as base64-encoded JSON.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use tracing::warn;

use warbler_types::api::Flash;

pub const FLASH_COOKIE: &str = "warbler_flash";

pub const SUCCESS: &str = "success";
pub const DANGER: &str = "danger";

/// Appends a flash to whatever the jar already carries.
pub fn push(jar: CookieJar, category: &str, message: impl Into<String>) -> CookieJar {
    let mut flashes = read(&jar);
    flashes.push(Flash {
        category: category.to_string(),
        message: message.into(),
    });

    let value = match serde_json::to_vec(&flashes) {
        Ok(json) => B64.encode(json),
        Err(e) => {
            warn!("Failed to encode flashes: {}", e);
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Drains pending flashes and clears the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let flashes = read(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, flashes);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flashes)
}

fn read(jar: &CookieJar) -> Vec<Flash> {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return Vec::new();
    };

    // A tampered or stale cookie just drops its flashes.
    B64.decode(cookie.value())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_take_drains_in_order() {
        let jar = push(CookieJar::new(), SUCCESS, "Hello, testuser!");
        let jar = push(jar, DANGER, "Access unauthorized.");

        let (jar, flashes) = take(jar);
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].message, "Hello, testuser!");
        assert_eq!(flashes[1].category, DANGER);

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn garbage_cookie_yields_nothing() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "%%%not-base64"));
        let (_, flashes) = take(jar);
        assert!(flashes.is_empty());
    }
}
