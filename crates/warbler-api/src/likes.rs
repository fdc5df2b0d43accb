use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use warbler_db::DbError;
use warbler_types::models::Message;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::messages::message_view;
use crate::middleware::AuthContext;

/// POST /messages/{message_id}/like: likes the message, or unlikes it if the
/// session user already does. The check and the write share one transaction.
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth.require()?;

    // A missing message fails the likes foreign key inside the toggle.
    let liked = state.db.toggle_like(user.id, message_id).map_err(|e| match e {
        DbError::Constraint(_) => ApiError::NotFound("Message"),
        other => other.into(),
    })?;
    debug!(
        "User #{} {} message #{}",
        user.id,
        if liked { "liked" } else { "unliked" },
        message_id
    );

    Ok(Redirect::to("/"))
}

/// GET /users/{user_id}/likes
pub async fn show_likes(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Message>>, ApiError> {
    auth.require()?;

    if state.db.get_user_by_id(user_id)?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    let rows = state.db.liked_messages(user_id)?;
    Ok(Json(rows.into_iter().map(message_view).collect()))
}
