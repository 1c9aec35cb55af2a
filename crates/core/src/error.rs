//! Error types for Study Space Core

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl Error {
    /// Reclassify SQLite constraint failures so callers can report them as
    /// client errors. Every other error passes through untouched.
    pub fn classify(self) -> Self {
        match self {
            Error::Database(rusqlite::Error::SqliteFailure(err, msg))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                let detail = msg.unwrap_or_else(|| err.to_string());
                let reason = if detail.contains("FOREIGN KEY") {
                    "referenced user or study space does not exist".to_string()
                } else {
                    detail
                };
                Error::Constraint(reason)
            }
            other => other,
        }
    }

    /// True for errors caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::NotFound(_)
                | Error::InvalidTransition(_)
                | Error::Constraint(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_classify_foreign_key_failure() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id TEXT PRIMARY KEY);
             CREATE TABLE child (id TEXT PRIMARY KEY, parent_id TEXT NOT NULL REFERENCES parent(id));",
        )
        .unwrap();

        let err = conn
            .execute("INSERT INTO child (id, parent_id) VALUES ('c', 'missing')", [])
            .unwrap_err();
        let classified = Error::from(err).classify();

        assert!(matches!(classified, Error::Constraint(ref m) if m.contains("does not exist")));
        assert!(classified.is_client_error());
    }

    #[test]
    fn test_classify_passes_other_errors() {
        let err = Error::from(rusqlite::Error::QueryReturnedNoRows).classify();
        assert!(matches!(err, Error::Database(_)));
        assert!(!err.is_client_error());
    }
}
