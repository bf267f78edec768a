use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use warbler_db::{Database, DbError};
use warbler_types::api::{LoginForm, SignupForm};
use warbler_types::flash::FlashCategory;

use crate::error::AppError;
use crate::flash::flash;
use crate::middleware::CurrentUser;
use crate::pages::{self, found};
use crate::session::{do_login, do_logout};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub session_days: i64,
}

impl AppStateInner {
    /// Run a blocking DB call off the async runtime.
    pub async fn run<F, T>(self: &Arc<Self>, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&state.db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                anyhow!("spawn_blocking join error: {}", e)
            })?
    }
}

pub async fn signup_form(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return found("/");
    }
    pages::render(jar, |f| pages::signup(&SignupForm::default(), &[], f)).into_response()
}

pub async fn signup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(found("/"));
    }
    let Form(form) = form?;

    let errors = validate_signup(&form);
    if !errors.is_empty() {
        return Ok(pages::render(jar, |f| pages::signup(&form, &errors, f)).into_response());
    }

    let req = form.clone();
    let result = state
        .run(move |db| {
            db.signup(
                req.username.trim(),
                req.email.trim(),
                &req.password,
                req.image_url.as_deref(),
            )
        })
        .await;

    match result {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "User signed up");
            let jar = do_login(jar, &state.jwt_secret, user.id, state.session_days)?;
            Ok((jar, found("/")).into_response())
        }
        Err(e) => match DbError::find(&e) {
            Some(conflict @ (DbError::UsernameTaken | DbError::EmailTaken)) => {
                let jar = flash(jar, FlashCategory::Danger, conflict.to_string());
                Ok(pages::render(jar, |f| pages::signup(&form, &[], f)).into_response())
            }
            _ => Err(e.into()),
        },
    }
}

fn validate_signup(form: &SignupForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.username.trim().is_empty() {
        errors.push("Username is required.".to_string());
    }
    if !is_plausible_email(&form.email) {
        errors.push("Invalid email address.".to_string());
    }
    if form.password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters.".to_string());
    }
    errors
}

pub(crate) fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

pub async fn login_form(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return found("/");
    }
    pages::render(jar, |f| pages::login("", &[], f)).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(LoginForm { username, password }) = form?;

    let name = username.clone();
    let user = state.run(move |db| db.authenticate(&name, &password)).await?;

    match user {
        Some(user) => {
            info!(user_id = user.id, username = %user.username, "User logged in");
            let jar = do_login(jar, &state.jwt_secret, user.id, state.session_days)?;
            let jar = flash(jar, FlashCategory::Success, format!("Hello, {}!", user.username));
            Ok((jar, found("/")).into_response())
        }
        None => {
            warn!(username = %username, "Failed login attempt");
            let jar = flash(jar, FlashCategory::Danger, "Invalid credentials.");
            Ok(pages::render(jar, |f| pages::login(&username, &[], f)).into_response())
        }
    }
}

pub async fn logout(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if let Some(user) = &user {
        info!(user_id = user.id, "User logged out");
    }
    let jar = flash(do_logout(jar), FlashCategory::Success, "You have successfully logged out.");
    (jar, found("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_email() {
        assert!(is_plausible_email("test@test.com"));
        assert!(!is_plausible_email("test.com"));
        assert!(!is_plausible_email("@test.com"));
        assert!(!is_plausible_email("test@localhost"));
    }

    #[test]
    fn test_validate_signup() {
        let form = SignupForm {
            username: " ".into(),
            email: "nope".into(),
            password: "123".into(),
            image_url: None,
        };
        assert_eq!(validate_signup(&form).len(), 3);

        let form = SignupForm {
            username: "testuser".into(),
            email: "test@test.com".into(),
            password: "testuser".into(),
            image_url: None,
        };
        assert!(validate_signup(&form).is_empty());

        // Six characters, more than six bytes
        let form = SignupForm {
            password: "пароль".into(),
            ..form
        };
        assert!(validate_signup(&form).is_empty());

        let form = SignupForm {
            password: "éééé".into(),
            ..form
        };
        assert_eq!(validate_signup(&form), vec!["Password must be at least 6 characters.".to_string()]);
    }
}
