use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use warbler_db::queries::MESSAGE_LIMIT;

use crate::auth::AppState;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::pages;

/// GET / — timeline when logged in, landing page otherwise.
pub async fn homepage(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(pages::render(jar, pages::home_anon).into_response());
    };

    let me_id = me.id;
    let (messages, liked, counts) = state
        .run(move |db| {
            Ok((
                db.timeline(me_id, MESSAGE_LIMIT)?,
                db.liked_message_ids(me_id)?,
                db.counts(me_id)?,
            ))
        })
        .await?;

    Ok(pages::render(jar, |f| pages::home(&me, &counts, &messages, &liked, f)).into_response())
}

pub async fn not_found(CurrentUser(viewer): CurrentUser, jar: CookieJar) -> Response {
    let (jar, html) = pages::render(jar, |f| pages::not_found(viewer.as_ref(), f));
    (StatusCode::NOT_FOUND, jar, html).into_response()
}
