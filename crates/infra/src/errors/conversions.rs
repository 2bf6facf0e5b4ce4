//! Conversions from external infrastructure errors into domain errors.

use dealboard_domain::DealboardError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DealboardError);

impl From<InfraError> for DealboardError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DealboardError> for InfraError {
    fn from(value: DealboardError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDealboardError {
    fn into_dealboard(self) -> DealboardError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DealboardError */
/* -------------------------------------------------------------------------- */

impl IntoDealboardError for SqlError {
    fn into_dealboard(self) -> DealboardError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        DealboardError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        DealboardError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        DealboardError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        DealboardError::Database("foreign key constraint violation".into())
                    }
                    _ => DealboardError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                DealboardError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                DealboardError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                DealboardError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                DealboardError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                DealboardError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => DealboardError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => DealboardError::Database("invalid SQL query".into()),
            other => DealboardError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_dealboard())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → DealboardError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(DealboardError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DealboardError */
/* -------------------------------------------------------------------------- */

impl IntoDealboardError for HttpError {
    fn into_dealboard(self) -> DealboardError {
        if self.is_timeout() {
            return DealboardError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return DealboardError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => DealboardError::Auth(message),
                404 => DealboardError::NotFound(message),
                429 => DealboardError::Network(message),
                400..=499 => DealboardError::InvalidInput(message),
                _ => DealboardError::Network(message),
            };
        }

        DealboardError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_dealboard())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use rusqlite::Error as SqlError;
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: DealboardError = InfraError::from(err).into();
        match mapped {
            DealboardError::Database(msg) => {
                assert!(msg.contains("busy") || msg.contains("locked"));
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: DealboardError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, DealboardError::NotFound(_)));
    }

    #[test]
    fn http_status_401_maps_to_auth_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: DealboardError = InfraError::from(error).into();
            match mapped {
                DealboardError::Auth(msg) => assert!(msg.contains("401")),
                other => panic!("expected auth error, got {:?}", other),
            }
        });
    }

    #[test]
    fn http_status_429_maps_to_network_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::TOO_MANY_REQUESTS))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: DealboardError = InfraError::from(error).into();
            assert!(matches!(mapped, DealboardError::Network(_)));
        });
    }
}
