//! Error types for the gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use steg_fhir_client::CredentialsError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("The username or password is incorrect")]
    Unauthorized,

    #[error("User is not confirmed")]
    Unconfirmed,

    #[error("Data store request failed: {0}")]
    DataStore(String),

    #[error("Prompt flow completed without success: {reasons}")]
    FlowFailed { reasons: String, duration: String },

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<steg_fhir_client::Error> for Error {
    fn from(err: steg_fhir_client::Error) -> Self {
        match err {
            steg_fhir_client::Error::Credentials(CredentialsError::Unauthorized) => {
                Error::Unauthorized
            }
            steg_fhir_client::Error::Credentials(CredentialsError::Unconfirmed) => {
                Error::Unconfirmed
            }
            steg_fhir_client::Error::Credentials(CredentialsError::Upstream(message)) => {
                Error::Upstream(message)
            }
            steg_fhir_client::Error::DataStore { status, body } => {
                Error::DataStore(format!("status {status}: {body}"))
            }
            other => Error::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidInput(_) | Error::FlowFailed { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Unconfirmed => StatusCode::FORBIDDEN,
            Error::DataStore(_) => StatusCode::BAD_GATEWAY,
            Error::Upstream(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            Error::FlowFailed { reasons, duration } => json!({
                "error": format!(
                    "The prompt flow invocation completed because of the following reasons: {reasons}"
                ),
                "duration": duration,
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_distinct_statuses() {
        let unauthorized: Error =
            steg_fhir_client::Error::Credentials(CredentialsError::Unauthorized).into();
        assert_eq!(
            unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );

        let unconfirmed: Error =
            steg_fhir_client::Error::Credentials(CredentialsError::Unconfirmed).into();
        assert_eq!(unconfirmed.into_response().status(), StatusCode::FORBIDDEN);

        let upstream: Error =
            steg_fhir_client::Error::Credentials(CredentialsError::Upstream("x".to_string()))
                .into();
        assert_eq!(
            upstream.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn data_store_failures_are_bad_gateway() {
        let error: Error = steg_fhir_client::Error::DataStore {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
