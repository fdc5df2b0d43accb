use rusqlite::{ErrorCode, ffi};
use thiserror::Error;

/// Store-level failures. Integrity violations are split out of the raw SQLite
/// error so callers can branch on them without string matching.
#[derive(Debug, Error)]
pub enum DbError {
    /// UNIQUE or PRIMARY KEY violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// NOT NULL, CHECK or FOREIGN KEY violation.
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                let detail = msg.clone().unwrap_or_else(|| e.to_string());
                match e.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        DbError::Conflict(detail)
                    }
                    _ => DbError::Constraint(detail),
                }
            }
            _ => DbError::Sqlite(err),
        }
    }
}

impl DbError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}
