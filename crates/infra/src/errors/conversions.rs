//! Conversions from external infrastructure errors into domain errors.

use preppulse_domain::PrepPulseError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PrepPulseError);

impl From<InfraError> for PrepPulseError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PrepPulseError> for InfraError {
    fn from(value: PrepPulseError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → PrepPulseError */
/* -------------------------------------------------------------------------- */

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let domain_error = match value {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        PrepPulseError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        PrepPulseError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        PrepPulseError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        PrepPulseError::Database("foreign key constraint violation".into())
                    }
                    _ => PrepPulseError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                PrepPulseError::NotFound("no rows returned by query".into())
            }
            other => PrepPulseError::Database(other.to_string()),
        };
        InfraError(domain_error)
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → PrepPulseError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(PrepPulseError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PrepPulseError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let domain_error = if value.is_timeout() {
            PrepPulseError::Network(format!("request timed out: {value}"))
        } else if value.is_connect() {
            PrepPulseError::Network(format!("connection failed: {value}"))
        } else if value.is_decode() {
            PrepPulseError::InvalidInput(format!("failed to decode response: {value}"))
        } else {
            PrepPulseError::Network(value.to_string())
        };
        InfraError(domain_error)
    }
}
