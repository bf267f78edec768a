use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use warbler_types::api::Claims;

/// Cookie holding the logged-in user's session token.
pub const CURR_USER_KEY: &str = "curr_user";

pub fn create_token(secret: &str, user_id: i64, ttl_days: i64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(ttl_days)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// User id from a valid, unexpired token.
pub fn user_id_from_token(secret: &str, token: &str) -> Option<i64> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    token_data.claims.sub.parse().ok()
}

pub fn do_login(jar: CookieJar, secret: &str, user_id: i64, ttl_days: i64) -> anyhow::Result<CookieJar> {
    let token = create_token(secret, user_id, ttl_days)?;
    let cookie = Cookie::build((CURR_USER_KEY, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok(jar.add(cookie))
}

pub fn do_logout(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(CURR_USER_KEY).path("/"))
}
