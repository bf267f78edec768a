#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use axum_extra::extract::cookie::Cookie;
use http_body_util::BodyExt;
use tower::ServiceExt;

use warbler_api::auth::{AppState, AppStateInner};
use warbler_api::build_router;
use warbler_api::session::{CURR_USER_KEY, create_token};
use warbler_db::Database;
use warbler_db::models::UserRow;

pub const SECRET: &str = "test-secret";

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Drives the router in-process and keeps cookies between requests,
/// the way a browser would.
pub struct TestClient {
    app: Router,
    pub state: AppState,
    cookies: HashMap<String, String>,
}

impl TestClient {
    pub fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().expect("in-memory database"),
            jwt_secret: SECRET.to_string(),
            session_days: 1,
        });
        Self {
            app: build_router(state.clone()),
            state,
            cookies: HashMap::new(),
        }
    }

    /// Two users, `testuser` (id 1) and `testuser2` (id 2).
    pub fn with_users() -> (Self, UserRow, UserRow) {
        let client = Self::new();
        let u1 = client
            .state
            .db
            .signup("testuser", "test@test.com", "testuser", None)
            .expect("signup testuser");
        let u2 = client
            .state
            .db
            .signup("testuser2", "test2@test.com", "testuser2", None)
            .expect("signup testuser2");
        (client, u1, u2)
    }

    /// Put a user id in the session without going through the login form.
    pub fn login_as(&mut self, user_id: i64) {
        let token = create_token(SECRET, user_id, 1).expect("session token");
        self.cookies.insert(CURR_USER_KEY.to_string(), token);
    }

    pub fn logout(&mut self) {
        self.cookies.remove(CURR_USER_KEY);
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn is_logged_in(&self) -> bool {
        self.cookies.contains_key(CURR_USER_KEY)
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self.request("GET", uri).body(Body::empty()).expect("request");
        self.send(req).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(form).expect("form encoding")))
            .expect("request");
        self.send(req).await
    }

    pub async fn get_follow(&mut self, uri: &str) -> TestResponse {
        let resp = self.get(uri).await;
        self.follow_redirects(resp).await
    }

    pub async fn post_follow(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let resp = self.post(uri, form).await;
        self.follow_redirects(resp).await
    }

    async fn follow_redirects(&mut self, mut resp: TestResponse) -> TestResponse {
        for _ in 0..10 {
            if !resp.status.is_redirection() {
                return resp;
            }
            let location = resp.location.clone().expect("redirect without Location");
            resp = self.get(&location).await;
        }
        panic!("too many redirects");
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let cookie_header = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie_header);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp = self.app.clone().oneshot(req).await.expect("infallible router");

        for value in resp.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().expect("ascii cookie").to_string();
            let cookie = Cookie::parse(raw).expect("valid Set-Cookie");
            if cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().expect("ascii location").to_string());
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
