use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use tracing::info;

use warbler_db::DbError;
use warbler_db::models::{UserRow, UserUpdate};
use warbler_types::api::{ProfileResponse, ProfileUpdateRequest, UserSearch};
use warbler_types::models::{User, UserStats};

use crate::auth::{AppState, log_out};
use crate::credentials;
use crate::error::ApiError;
use crate::flash;
use crate::messages::message_view;
use crate::middleware::AuthContext;

/// GET /users?q=: every user, or those whose username contains `q`.
pub async fn list_users(
    State(state): State<AppState>,
    Query(search): Query<UserSearch>,
) -> Result<Json<Vec<User>>, ApiError> {
    let rows = state.db.search_users(search.q.as_deref())?;
    Ok(Json(rows.into_iter().map(user_view).collect()))
}

pub async fn show_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<i64>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_id(user_id)?
        .ok_or(ApiError::NotFound("User"))?;

    let stats = state.db.user_stats(user_id)?;
    let messages = state.db.messages_for_user(user_id)?;
    let followed_by_viewer = match auth.user() {
        Some(viewer) => state.db.is_following(viewer.id, user_id)?,
        None => false,
    };

    Ok(Json(ProfileResponse {
        user: user_view(user),
        stats: UserStats {
            messages: stats.messages,
            followers: stats.followers,
            following: stats.following,
            likes: stats.likes,
        },
        messages: messages.into_iter().map(message_view).collect(),
        followed_by_viewer,
    }))
}

/// GET /users/{user_id}/following: visible to that user only.
pub async fn show_following(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<User>>, ApiError> {
    auth.require_user(user_id)?;

    let rows = state.db.following(user_id)?;
    Ok(Json(rows.into_iter().map(user_view).collect()))
}

/// GET /users/{user_id}/followers: visible to that user only.
pub async fn show_followers(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<User>>, ApiError> {
    auth.require_user(user_id)?;

    let rows = state.db.followers(user_id)?;
    Ok(Json(rows.into_iter().map(user_view).collect()))
}

pub async fn add_follow(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(follow_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth.require()?;

    if follow_id == user.id {
        return Err(ApiError::Validation("You cannot follow yourself".into()));
    }
    if state.db.get_user_by_id(follow_id)?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    if state.db.follow(user.id, follow_id)? {
        info!("User #{} followed #{}", user.id, follow_id);
    }

    Ok(Redirect::to(&format!("/users/{}/following", user.id)))
}

pub async fn stop_following(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(follow_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth.require()?;

    if state.db.unfollow(user.id, follow_id)? {
        info!("User #{} unfollowed #{}", user.id, follow_id);
    }

    Ok(Redirect::to(&format!("/users/{}/following", user.id)))
}

/// POST /users/profile: the current password must be re-entered.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    jar: CookieJar,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth.require()?;

    if credentials::authenticate(&state.db, &user.username, &req.password)?.is_none() {
        return Err(ApiError::InvalidCredentials);
    }

    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(ApiError::Validation("username and email are required".into()));
    }

    let update = UserUpdate {
        username: username.to_string(),
        email: email.to_string(),
        image_url: req.image_url,
        header_image_url: req.header_image_url,
        bio: req.bio,
        location: req.location,
    };

    state.db.update_user(user.id, &update).map_err(|e| match e {
        DbError::Conflict(_) => ApiError::Conflict("Username or email already taken".into()),
        other => other.into(),
    })?;

    info!("User #{} updated their profile", user.id);
    let jar = flash::push(jar, flash::SUCCESS, "Profile updated.");
    Ok((jar, Redirect::to(&format!("/users/{}", user.id))))
}

/// POST /users/delete: removes the session user and logs out.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let user = auth.require()?;

    state.db.delete_user(user.id)?;
    info!("User #{} deleted their account", user.id);

    let jar = log_out(jar);
    let jar = flash::push(jar, flash::SUCCESS, "Your account has been deleted.");
    Ok((jar, Redirect::to("/")))
}

pub(crate) fn user_view(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
        image_url: row.image_url,
        header_image_url: row.header_image_url,
        bio: row.bio,
        location: row.location,
    }
}
