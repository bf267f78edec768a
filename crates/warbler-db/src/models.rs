//! Row types that stay inside the DB layer. Only `UserRow` needs one: it
//! carries the password hash, which must never reach the view types.

use std::fmt;

use warbler_types::models::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Argon2 PHC string
    pub password: String,
}

impl fmt::Display for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            image_url: row.image_url,
            header_image_url: row.header_image_url,
            bio: row.bio,
            location: row.location,
        }
    }
}

/// New profile values. Empty image fields fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}
