use axum::{
    Form,
    extract::{Path, Query, State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info, warn};

use warbler_db::DbError;
use warbler_db::models::ProfileUpdate;
use warbler_db::queries::MESSAGE_LIMIT;
use warbler_types::api::{ProfileForm, SearchQuery};
use warbler_types::flash::FlashCategory;
use warbler_types::models::{User, UserCounts};

use crate::auth::{AppState, is_plausible_email};
use crate::error::AppError;
use crate::flash::{flash, unauthorized};
use crate::middleware::CurrentUser;
use crate::pages::{self, found};
use crate::session::do_logout;

/// Everything the profile header needs.
pub(crate) struct Profile {
    pub user: User,
    pub counts: UserCounts,
    /// Whether the viewer follows this user.
    pub is_following: bool,
}

pub(crate) async fn load_profile(state: &AppState, user_id: i64, viewer_id: Option<i64>) -> Result<Profile, AppError> {
    let profile = state
        .run(move |db| {
            let Some(row) = db.get_user(user_id)? else {
                return Ok(None);
            };
            let counts = db.counts(user_id)?;
            let is_following = match viewer_id {
                Some(viewer) => db.is_following(viewer, user_id)?,
                None => false,
            };
            Ok(Some(Profile {
                user: row.into(),
                counts,
                is_following,
            }))
        })
        .await?;

    profile.ok_or(AppError::NotFound)
}

/// GET /users?q= — search by username.
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let q = query.q.unwrap_or_default();
    let rows = state.run(move |db| db.search_users(q.trim())).await?;
    let users: Vec<User> = rows.into_iter().map(User::from).collect();

    Ok(pages::render(jar, |f| pages::users_index(viewer.as_ref(), &users, f)).into_response())
}

pub async fn show_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let viewer_id = viewer.as_ref().map(|v| v.id);
    let profile = load_profile(&state, user_id, viewer_id).await?;

    let (messages, liked) = state
        .run(move |db| {
            let messages = db.user_messages(user_id, MESSAGE_LIMIT)?;
            let liked = match viewer_id {
                Some(id) => db.liked_message_ids(id)?,
                None => Vec::new(),
            };
            Ok((messages, liked))
        })
        .await?;

    Ok(pages::render(jar, |f| {
        pages::user_show(
            viewer.as_ref(),
            &profile.user,
            &profile.counts,
            profile.is_following,
            &messages,
            &liked,
            f,
        )
    })
    .into_response())
}

pub async fn show_following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "view following"));
    };

    let profile = load_profile(&state, user_id, Some(me.id)).await?;
    let rows = state.run(move |db| db.following(user_id)).await?;
    let users: Vec<User> = rows.into_iter().map(User::from).collect();

    Ok(pages::render(jar, |f| {
        pages::follow_list(&me, &profile.user, &profile.counts, profile.is_following, "Following", &users, f)
    })
    .into_response())
}

pub async fn show_followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "view followers"));
    };

    let profile = load_profile(&state, user_id, Some(me.id)).await?;
    let rows = state.run(move |db| db.followers(user_id)).await?;
    let users: Vec<User> = rows.into_iter().map(User::from).collect();

    Ok(pages::render(jar, |f| {
        pages::follow_list(&me, &profile.user, &profile.counts, profile.is_following, "Followers", &users, f)
    })
    .into_response())
}

/// POST /users/follow/{follow_id}
pub async fn follow(
    State(state): State<AppState>,
    Path(follow_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "follow"));
    };

    let me_id = me.id;
    let found_user = state
        .run(move |db| {
            if db.get_user(follow_id)?.is_none() {
                return Ok(false);
            }
            db.follow(me_id, follow_id)?;
            Ok(true)
        })
        .await
        .map_err(|e| match DbError::find(&e) {
            Some(DbError::SelfFollow) => AppError::BadRequest("users cannot follow themselves".into()),
            _ => AppError::from(e),
        })?;

    if !found_user {
        return Err(AppError::NotFound);
    }

    debug!(follower = me.id, followed = follow_id, "Followed user");
    Ok(found(format!("/users/{}/following", me.id)))
}

/// POST /users/stop-following/{follow_id}
pub async fn stop_following(
    State(state): State<AppState>,
    Path(follow_id): Path<i64>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "stop following"));
    };

    let me_id = me.id;
    state.run(move |db| db.unfollow(me_id, follow_id)).await?;

    debug!(follower = me.id, followed = follow_id, "Unfollowed user");
    Ok(found(format!("/users/{}/following", me.id)))
}

pub async fn edit_profile_form(CurrentUser(viewer): CurrentUser, jar: CookieJar) -> Response {
    let Some(me) = viewer else {
        return unauthorized(jar, "edit profile");
    };

    let form = ProfileForm {
        username: me.username.clone(),
        email: me.email.clone(),
        image_url: Some(me.image_url.clone()),
        header_image_url: Some(me.header_image_url.clone()),
        bio: me.bio.clone(),
        location: me.location.clone(),
        password: String::new(),
    };
    pages::render(jar, |f| pages::profile_edit(&me, &form, &[], f)).into_response()
}

/// POST /users/profile — the current password must confirm the change.
pub async fn edit_profile(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "edit profile"));
    };
    let Form(form) = form?;

    let username = me.username.clone();
    let password = form.password.clone();
    let confirmed = state.run(move |db| db.authenticate(&username, &password)).await?;
    if confirmed.is_none() {
        warn!(user_id = me.id, "Profile edit with wrong password");
        let jar = flash(jar, FlashCategory::Danger, "Wrong password, please try again.");
        return Ok((jar, found("/")).into_response());
    }

    let mut errors = Vec::new();
    if form.username.trim().is_empty() {
        errors.push("Username is required.".to_string());
    }
    if !is_plausible_email(&form.email) {
        errors.push("Invalid email address.".to_string());
    }
    if !errors.is_empty() {
        return Ok(pages::render(jar, |f| pages::profile_edit(&me, &form, &errors, f)).into_response());
    }

    let update = ProfileUpdate {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        image_url: form.image_url.clone(),
        header_image_url: form.header_image_url.clone(),
        bio: form.bio.clone(),
        location: form.location.clone(),
    };
    let me_id = me.id;
    match state.run(move |db| db.update_user(me_id, &update)).await {
        Ok(_) => {
            info!(user_id = me.id, "Profile updated");
            Ok(found(format!("/users/{}", me.id)))
        }
        Err(e) => match DbError::find(&e) {
            Some(conflict @ (DbError::UsernameTaken | DbError::EmailTaken)) => {
                let errors = vec![conflict.to_string()];
                Ok(pages::render(jar, |f| pages::profile_edit(&me, &form, &errors, f)).into_response())
            }
            _ => Err(e.into()),
        },
    }
}

/// POST /users/delete — removes the account and ends the session.
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(jar, "delete user"));
    };

    let me_id = me.id;
    state.run(move |db| db.delete_user(me_id)).await?;
    info!(user_id = me.id, username = %me.username, "User deleted");

    Ok((do_logout(jar), found("/signup")).into_response())
}
