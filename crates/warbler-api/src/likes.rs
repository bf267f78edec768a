use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::AppState;
use crate::error::AppError;
use crate::flash::unauthorized;
use crate::middleware::CurrentUser;
use crate::pages::{self, found};
use crate::users::load_profile;

/// GET /users/{user_id}/likes
pub async fn show_likes(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "view likes"));
    };

    let profile = load_profile(&state, user_id, Some(me.id)).await?;
    let me_id = me.id;
    let (messages, liked) = state
        .run(move |db| Ok((db.likes(user_id)?, db.liked_message_ids(me_id)?)))
        .await?;

    Ok(pages::render(jar, |f| {
        pages::likes(&me, &profile.user, &profile.counts, profile.is_following, &messages, &liked, f)
    })
    .into_response())
}

/// POST /users/add_like/{message_id} — like or unlike someone else's message.
pub async fn add_like(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "like message"));
    };

    let message = state
        .run(move |db| db.get_message(message_id))
        .await?
        .ok_or(AppError::NotFound)?;

    if message.user_id == me.id {
        return Err(AppError::Forbidden);
    }

    let me_id = me.id;
    let added = state.run(move |db| db.toggle_like(me_id, message_id)).await?;
    debug!(user_id = me.id, message_id, added, "Toggled like");

    Ok(found("/"))
}
