use sqlx::error::ErrorKind;

use crate::application::repos::RepoError;

/// Translate driver errors into repository errors, keeping the name of a
/// violated unique constraint so services can tell duplicates apart.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation => {
                RepoError::duplicate(db.constraint().unwrap_or("unknown"))
            }
            ErrorKind::ForeignKeyViolation | ErrorKind::CheckViolation => {
                RepoError::Integrity {
                    message: db.message().to_string(),
                }
            }
            ErrorKind::NotNullViolation => RepoError::InvalidInput {
                message: db.message().to_string(),
            },
            _ if db.message().contains("canceling statement due to") => RepoError::Timeout,
            _ => RepoError::from_persistence(db),
        },
        other => RepoError::from_persistence(other),
    }
}

pub(super) fn count_to_u64(value: i64) -> Result<u64, RepoError> {
    u64::try_from(value).map_err(|_| RepoError::from_persistence("count exceeds supported range"))
}
