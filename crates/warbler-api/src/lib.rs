pub mod auth;
pub mod credentials;
pub mod error;
pub mod flash;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::auth::AppState;

/// All Warbler routes. Layers (tracing and the like) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(messages::home))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", post(users::update_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/{user_id}", get(users::show_user))
        .route("/users/{user_id}/following", get(users::show_following))
        .route("/users/{user_id}/followers", get(users::show_followers))
        .route("/users/{user_id}/likes", get(likes::show_likes))
        .route("/users/follow/{follow_id}", post(users::add_follow))
        .route("/users/stop-following/{follow_id}", post(users::stop_following))
        .route("/messages/new", post(messages::new_message))
        .route("/messages/{message_id}", get(messages::show_message))
        .route("/messages/{message_id}/delete", post(messages::delete_message))
        .route("/messages/{message_id}/like", post(likes::toggle_like))
        .with_state(state)
}
