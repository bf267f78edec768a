use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

/// Messages longer than this are rejected at creation.
pub const MAX_MESSAGE_LEN: usize = 140;

/// A user as seen by the view layer. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

/// A message joined with the bits of its author needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub image_url: String,
}

/// Profile header numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
    pub messages: i64,
    pub followers: i64,
    pub following: i64,
    pub likes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_display() {
        let user = User {
            id: 1,
            email: "test@test.com".into(),
            username: "testuser1".into(),
            image_url: DEFAULT_IMAGE_URL.into(),
            header_image_url: DEFAULT_HEADER_IMAGE_URL.into(),
            bio: None,
            location: None,
        };
        assert_eq!(user.to_string(), "<User #1: testuser1, test@test.com>");
    }
}
