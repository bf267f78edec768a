use crate::error::DbError;
use crate::models::{ProfileUpdate, UserRow};
use crate::{Database, password};
use anyhow::{Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, Row, params};
use warbler_types::models::{
    DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, MAX_MESSAGE_LEN, Message, UserCounts,
};

/// Upper bound for profile and timeline listings.
pub const MESSAGE_LIMIT: u32 = 100;

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.image_url, u.header_image_url, u.bio, u.location, u.password";

const MESSAGE_COLUMNS: &str = "m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url";

impl Database {
    // -- Users --

    /// Hash the password and insert a new user.
    pub fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<&str>,
    ) -> Result<UserRow> {
        let password_hash = password::hash(password)?;
        let image_url = non_empty(image_url).unwrap_or(DEFAULT_IMAGE_URL);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, username, image_url, password) VALUES (?1, ?2, ?3, ?4)",
                params![email, username, image_url, password_hash],
            )
            .map_err(unique_violation)?;

            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or_else(|| anyhow!("User {} missing after insert", id))
        })
    }

    /// The user if `username` exists and `password` matches, `None` otherwise.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRow>> {
        let Some(user) = self.get_user_by_username(username)? else {
            return Ok(None);
        };

        if password::verify(password, &user.password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
            conn.query_row(&sql, [username], map_user).optional()
        })
    }

    /// Users whose username contains `q`; all users when `q` is empty.
    pub fn search_users(&self, q: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE instr(lower(u.username), lower(?1)) > 0
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([q], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_user(&self, id: i64, update: &ProfileUpdate) -> Result<UserRow> {
        let image_url = non_empty(update.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL);
        let header_image_url =
            non_empty(update.header_image_url.as_deref()).unwrap_or(DEFAULT_HEADER_IMAGE_URL);

        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE users
                     SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4,
                         bio = ?5, location = ?6
                     WHERE id = ?7",
                    params![
                        update.username,
                        update.email,
                        image_url,
                        header_image_url,
                        non_empty(update.bio.as_deref()),
                        non_empty(update.location.as_deref()),
                        id
                    ],
                )
                .map_err(unique_violation)?;

            if changed == 0 {
                return Err(anyhow!("User not found: {}", id));
            }
            query_user_by_id(conn, id)?.ok_or_else(|| anyhow!("User not found: {}", id))
        })
    }

    /// Removes the user along with their messages, follows and likes.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    pub fn counts(&self, user_id: i64) -> Result<UserCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [user_id],
                |row| {
                    Ok(UserCounts {
                        messages: row.get(0)?,
                        followers: row.get(1)?,
                        following: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }

    // -- Messages --

    /// Stores the text trimmed; the length limit applies after trimming.
    pub fn create_message(&self, user_id: i64, text: &str) -> Result<Message> {
        let text = text.trim();
        validate_message(text)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
                params![text, Utc::now(), user_id],
            )?;

            let id = conn.last_insert_rowid();
            query_message(conn, id)?.ok_or_else(|| anyhow!("Message {} missing after insert", id))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<Message>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// A user's own messages, newest first.
    pub fn user_messages(&self, user_id: i64, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 WHERE m.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            query_messages(conn, &sql, params![user_id, limit])
        })
    }

    /// Home feed: the user's messages plus those of everyone they follow.
    pub fn timeline(&self, user_id: i64, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 WHERE m.user_id = ?1
                    OR m.user_id IN (
                        SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                    )
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            query_messages(conn, &sql, params![user_id, limit])
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Follows --

    /// `follower_id` starts following `followed_id`. Following twice is a no-op.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<()> {
        if follower_id == followed_id {
            return Err(DbError::SelfFollow.into());
        }

        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id)
                 VALUES (?1, ?2)",
                params![followed_id, follower_id],
            )?;
            Ok(())
        })
    }

    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                params![followed_id, follower_id],
            )?;
            Ok(deleted > 0)
        })
    }

    /// Does `user_id` follow `other_id`?
    pub fn is_following(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM follows
                    WHERE user_following_id = ?1 AND user_being_followed_id = ?2
                 )",
                params![user_id, other_id],
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    /// Is `user_id` followed by `other_id`?
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.is_following(other_id, user_id)
    }

    /// Users following `user_id`.
    pub fn followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS}
                 FROM users u
                 JOIN follows f ON f.user_following_id = u.id
                 WHERE f.user_being_followed_id = ?1
                 ORDER BY u.username"
            );
            query_users(conn, &sql, user_id)
        })
    }

    /// Users `user_id` follows.
    pub fn following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS}
                 FROM users u
                 JOIN follows f ON f.user_being_followed_id = u.id
                 WHERE f.user_following_id = ?1
                 ORDER BY u.username"
            );
            query_users(conn, &sql, user_id)
        })
    }

    // -- Likes --

    /// Toggle a like: removes it if present, inserts it if not.
    /// Returns true when the like now exists.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                params![user_id, message_id],
            )?;
            if removed > 0 {
                return Ok(false);
            }

            conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                params![user_id, message_id],
            )?;
            Ok(true)
        })
    }

    pub fn liked_message_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT message_id FROM likes WHERE user_id = ?1")?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Messages `user_id` has liked, newest first.
    pub fn likes(&self, user_id: i64) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM likes l
                 JOIN messages m ON l.message_id = m.id
                 JOIN users u ON m.user_id = u.id
                 WHERE l.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC"
            );
            query_messages(conn, &sql, params![user_id])
        })
    }
}

fn validate_message(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(DbError::InvalidMessage("text is required".into()).into());
    }
    let len = text.chars().count();
    if len > MAX_MESSAGE_LEN {
        return Err(DbError::InvalidMessage(format!(
            "text is {} characters, the limit is {}",
            len, MAX_MESSAGE_LEN
        ))
        .into());
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Turn UNIQUE failures on users into the matching `DbError`.
fn unique_violation(err: rusqlite::Error) -> anyhow::Error {
    if let rusqlite::Error::SqliteFailure(e, Some(msg)) = &err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("users.username") {
                return DbError::UsernameTaken.into();
            }
            if msg.contains("users.email") {
                return DbError::EmailTaken.into();
            }
        }
    }
    err.into()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        image_url: row.get(3)?,
        header_image_url: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        password: row.get(7)?,
    })
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
        username: row.get(4)?,
        image_url: row.get(5)?,
    })
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    conn.query_row(&sql, [id], map_user).optional()
}

fn query_users(conn: &Connection, sql: &str, user_id: i64) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([user_id], map_user)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<Message>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages m JOIN users u ON m.user_id = u.id WHERE m.id = ?1"
    );
    conn.query_row(&sql, [id], map_message).optional()
}

fn query_messages(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map_message)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
