use thiserror::Error;

/// Conditions callers are expected to branch on. Anything else surfaces as
/// a plain `anyhow::Error`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DbError {
    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already taken")]
    EmailTaken,

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Users cannot follow themselves")]
    SelfFollow,
}

impl DbError {
    /// Finds a `DbError` inside an `anyhow` chain.
    pub fn find(err: &anyhow::Error) -> Option<&DbError> {
        err.downcast_ref::<DbError>()
    }
}
