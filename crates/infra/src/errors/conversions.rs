//! Conversions from external infrastructure errors into domain errors.

use rusqlite::Error as SqlError;
use salesdesk_domain::SalesdeskError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SalesdeskError);

impl From<InfraError> for SalesdeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SalesdeskError> for InfraError {
    fn from(value: SalesdeskError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSalesdeskError {
    fn into_salesdesk(self) -> SalesdeskError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SalesdeskError */
/* -------------------------------------------------------------------------- */

impl IntoSalesdeskError for SqlError {
    fn into_salesdesk(self) -> SalesdeskError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SalesdeskError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SalesdeskError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        SalesdeskError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        SalesdeskError::Database("foreign key constraint violation".into())
                    }
                    _ => SalesdeskError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                SalesdeskError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                SalesdeskError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SalesdeskError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                SalesdeskError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                SalesdeskError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => SalesdeskError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => SalesdeskError::Database("invalid SQL query".into()),
            other => SalesdeskError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_salesdesk())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_maps_to_not_found() {
        let err: SalesdeskError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(err, SalesdeskError::NotFound(_)));
    }

    #[test]
    fn invalid_query_maps_to_database() {
        let err: SalesdeskError = InfraError::from(SqlError::InvalidQuery).into();
        assert!(matches!(err, SalesdeskError::Database(_)));
    }
}
