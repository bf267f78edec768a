pub mod auth;
pub mod error;
pub mod flash;
pub mod home;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod users;

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post},
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AppState;
use crate::middleware::load_current_user;

/// All Warbler routes, with the session user resolved for every request.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::homepage))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", get(users::edit_profile_form).post(users::edit_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/{user_id}", get(users::show_user))
        .route("/users/{user_id}/following", get(users::show_following))
        .route("/users/{user_id}/followers", get(users::show_followers))
        .route("/users/{user_id}/likes", get(likes::show_likes))
        .route("/users/follow/{follow_id}", post(users::follow))
        .route("/users/stop-following/{follow_id}", post(users::stop_following))
        .route("/users/add_like/{message_id}", post(likes::add_like))
        .route("/messages/new", get(messages::new_message_form).post(messages::add_message))
        .route("/messages/{message_id}", get(messages::show_message))
        .route("/messages/{message_id}/delete", post(messages::delete_message))
        .fallback(home::not_found)
        .layer(axum::middleware::from_fn_with_state(state.clone(), load_current_user))
        // Session-dependent pages must never be cached
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(header::PRAGMA, HeaderValue::from_static("no-cache")))
        .layer(SetResponseHeaderLayer::overriding(header::EXPIRES, HeaderValue::from_static("0")))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
