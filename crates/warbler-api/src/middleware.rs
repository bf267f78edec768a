use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use warbler_types::models::User;

use crate::auth::AppState;
use crate::session::{CURR_USER_KEY, user_id_from_token};

/// The logged-in user for this request, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned().unwrap_or_default())
    }
}

/// Resolve the session cookie to a user before every handler runs.
/// A bad token or a deleted account both count as logged out.
pub async fn load_current_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let user_id = jar
        .get(CURR_USER_KEY)
        .and_then(|c| user_id_from_token(&state.jwt_secret, c.value()));

    let user = match user_id {
        Some(id) => match state.run(move |db| db.get_user(id)).await {
            Ok(row) => row.map(User::from),
            Err(e) => {
                error!("Failed to load session user {}: {:#}", id, e);
                None
            }
        },
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}
