use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use tracing::warn;

use warbler_types::flash::{Flash, FlashCategory};

use crate::pages::found;

/// Cookie holding pending flashes as base64url-encoded JSON.
pub const FLASH_COOKIE: &str = "_flashes";

pub const UNAUTHORIZED_MESSAGE: &str = "Access unauthorized.";

/// Pending flashes kept per client; older ones are dropped first.
pub const MAX_FLASHES: usize = 5;

/// Queue a message for the next rendered page.
pub fn flash(jar: CookieJar, category: FlashCategory, message: impl Into<String>) -> CookieJar {
    let mut flashes = read(&jar);
    flashes.push(Flash::new(category, message));
    if flashes.len() > MAX_FLASHES {
        flashes.drain(..flashes.len() - MAX_FLASHES);
    }

    let cookie = Cookie::build((FLASH_COOKIE, encode(&flashes)))
        .path("/")
        .http_only(true);
    jar.add(cookie)
}

/// Pending flashes, oldest first, with the cookie cleared.
pub fn take_flashes(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, Vec::new());
    }
    let flashes = read(&jar);
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flashes)
}

/// Flash "Access unauthorized." and send the client home.
pub fn unauthorized(jar: CookieJar, action: &str) -> Response {
    warn!(action, "Unauthorized request");
    (flash(jar, FlashCategory::Danger, UNAUTHORIZED_MESSAGE), found("/")).into_response()
}

fn read(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

fn encode(flashes: &[Flash]) -> String {
    B64.encode(serde_json::to_vec(flashes).unwrap_or_default())
}

/// A tampered or stale cookie just yields no flashes.
fn decode(value: &str) -> Vec<Flash> {
    B64.decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}
