use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use warbler_db::DbError;
use warbler_types::api::MessageForm;

use crate::auth::AppState;
use crate::error::AppError;
use crate::flash::unauthorized;
use crate::middleware::CurrentUser;
use crate::pages::{self, found};

pub async fn new_message_form(CurrentUser(viewer): CurrentUser, jar: CookieJar) -> Response {
    let Some(me) = viewer else {
        return unauthorized(jar, "add message");
    };
    pages::render(jar, |f| pages::message_new(&me, "", &[], f)).into_response()
}

/// POST /messages/new — post a message as the session user.
pub async fn add_message(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
    form: Result<Form<MessageForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "add message"));
    };
    let Form(form) = form?;

    let me_id = me.id;
    let text = form.text.clone();
    match state.run(move |db| db.create_message(me_id, &text)).await {
        Ok(message) => {
            info!(user_id = me.id, message_id = message.id, "Message posted");
            Ok(found(format!("/users/{}", me.id)))
        }
        Err(e) => match DbError::find(&e) {
            Some(invalid @ DbError::InvalidMessage(_)) => {
                let errors = vec![invalid.to_string()];
                Ok(pages::render(jar, |f| pages::message_new(&me, &form.text, &errors, f)).into_response())
            }
            _ => Err(e.into()),
        },
    }
}

pub async fn show_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let viewer_id = viewer.as_ref().map(|v| v.id);
    let (message, liked) = state
        .run(move |db| {
            let message = db.get_message(message_id)?;
            let liked = match viewer_id {
                Some(id) => db.liked_message_ids(id)?,
                None => Vec::new(),
            };
            Ok((message, liked))
        })
        .await?;
    let message = message.ok_or(AppError::NotFound)?;

    Ok(pages::render(jar, |f| pages::message_show(viewer.as_ref(), &message, &liked, f)).into_response())
}

/// POST /messages/{message_id}/delete — only the author may delete.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "delete message"));
    };

    let message = state
        .run(move |db| db.get_message(message_id))
        .await?
        .ok_or(AppError::NotFound)?;

    if message.user_id != me.id {
        return Ok(unauthorized(jar, "delete message"));
    }

    state.run(move |db| db.delete_message(message_id)).await?;
    info!(user_id = me.id, message_id, "Message deleted");

    Ok(found(format!("/users/{}", me.id)))
}
