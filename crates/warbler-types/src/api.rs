use serde::{Deserialize, Serialize};

// -- Session --

/// Claims of the session token kept in the `curr_user` cookie.
/// `sub` is the logged-in user's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Profile edit form. `password` confirms the change and is never stored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub password: String,
}

// -- Messages --

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MessageForm {
    pub text: String,
}
