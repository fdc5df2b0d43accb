use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use tracing::{info, warn};

use warbler_db::models::MessageRow;
use warbler_types::api::{HomeResponse, NewMessageRequest};
use warbler_types::models::{Message, User};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::flash;
use crate::middleware::AuthContext;
use crate::users::user_view;

pub const MAX_MESSAGE_LEN: usize = 140;
const TIMELINE_LIMIT: u32 = 100;

/// GET /: pending flashes, plus the timeline when logged in.
pub async fn home(
    State(state): State<AppState>,
    auth: AuthContext,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, flashes) = flash::take(jar);

    let (user, messages): (Option<User>, Vec<Message>) = match auth.user() {
        Some(current) => {
            let user = state.db.get_user_by_id(current.id)?.map(user_view);
            let rows = state.db.timeline(current.id, TIMELINE_LIMIT)?;
            (user, rows.into_iter().map(message_view).collect())
        }
        None => (None, Vec::new()),
    };

    Ok((jar, Json(HomeResponse { flashes, user, messages })))
}

pub async fn new_message(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<NewMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth.require()?;

    let text = req.text.trim();
    let len = text.chars().count();
    if len == 0 || len > MAX_MESSAGE_LEN {
        return Err(ApiError::Validation(format!(
            "Message text must be 1 to {MAX_MESSAGE_LEN} characters"
        )));
    }

    let message = state.db.insert_message(user.id, text)?;
    info!("User #{} posted message #{}", user.id, message.id);

    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

pub async fn show_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_message(message_id)?
        .ok_or(ApiError::NotFound("Message"))?;

    Ok(Json(message_view(row)))
}

/// Only the author may delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth.require()?;

    let row = state
        .db
        .get_message(message_id)?
        .ok_or(ApiError::NotFound("Message"))?;
    if row.user_id != user.id {
        return Err(auth.refuse());
    }

    state.db.delete_message(message_id)?;
    info!("User #{} deleted message #{}", user.id, message_id);

    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

pub(crate) fn message_view(row: MessageRow) -> Message {
    let timestamp = row
        .created_at
        .parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on message #{}: {}", row.created_at, row.id, e);
            chrono::DateTime::default()
        });

    Message {
        id: row.id,
        text: row.text,
        user_id: row.user_id,
        username: row.author_username,
        user_image_url: row.author_image_url,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(created_at: &str) -> MessageRow {
        MessageRow {
            id: 1,
            text: "warble".into(),
            user_id: 111,
            author_username: "test111".into(),
            author_image_url: "/img.png".into(),
            created_at: created_at.into(),
        }
    }

    #[test]
    fn parses_sqlite_timestamps_as_utc() {
        let m = message_view(row("2024-03-01 12:30:45"));
        assert_eq!(m.timestamp.to_rfc3339(), "2024-03-01T12:30:45+00:00");
        assert_eq!(m.username, "test111");
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        let m = message_view(row("yesterday"));
        assert_eq!(m.timestamp, chrono::DateTime::<chrono::Utc>::default());
    }
}
