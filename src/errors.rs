//! Errors for the chartering back-office
use sqlx::error::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ShipmanError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{entity} with {key} not found")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Stored value could not be decoded: {0}")]
    DecodingFault(String),

    #[error("Database unavailable: {0}")]
    ResourceExhausted(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,

    #[error("Configuration error")]
    ConfigError(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    ConfigurationError { message: String },

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Database error")]
    DatabaseError(sqlx::Error),
}

impl ShipmanError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<sqlx::Error> for ShipmanError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    let detail = match db.constraint() {
                        Some(constraint) => format!("{} ({})", db.message(), constraint),
                        None => db.message().to_string(),
                    };
                    Self::ConstraintViolation(detail)
                }
                _ => Self::DatabaseError(err),
            },
            sqlx::Error::PoolTimedOut => {
                Self::ResourceExhausted("timed out acquiring a pooled connection".to_string())
            }
            sqlx::Error::PoolClosed => {
                Self::ResourceExhausted("connection pool is closed".to_string())
            }
            sqlx::Error::Io(e) => Self::ResourceExhausted(e.to_string()),
            sqlx::Error::Tls(e) => Self::ResourceExhausted(e.to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::DecodingFault(format!("column {}: {}", index, source))
            }
            sqlx::Error::Decode(e) => Self::DecodingFault(e.to_string()),
            other => Self::DatabaseError(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_resource_exhausted() {
        let err = ShipmanError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ShipmanError::ResourceExhausted(_)));

        let err = ShipmanError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, ShipmanError::ResourceExhausted(_)));
    }

    #[test]
    fn unreachable_store_is_resource_exhausted() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ShipmanError::from(sqlx::Error::Io(io));
        assert!(matches!(err, ShipmanError::ResourceExhausted(_)));
    }

    #[test]
    fn malformed_identifier_is_decoding_fault() {
        let source = "not-a-uuid".parse::<Uuid>().unwrap_err();
        let err = ShipmanError::from(sqlx::Error::ColumnDecode {
            index: "\"voyage_id\"".to_string(),
            source: Box::new(source),
        });
        match err {
            ShipmanError::DecodingFault(message) => assert!(message.contains("voyage_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_found_message_names_entity() {
        let id = Uuid::nil();
        let err = ShipmanError::not_found("vessel", id);
        assert_eq!(err.to_string(), format!("vessel {} not found", id));
    }
}
