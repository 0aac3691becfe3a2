use reqwest::{StatusCode, Url};
use thiserror::Error;

/// Result type returned by every client operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error returned when a request to the provider fails.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be sent, or the response body could not be read.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The provider answered with a status other than the one the endpoint returns on success.
    #[error("unexpected status code: {status}")]
    UnexpectedStatus {
        status: u16,
        expected: u16,
        /// Response body, if it could be read.
        body: String,
    },

    /// A request or response body was not valid JSON for the expected shape.
    #[error("(de)serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL could not be parsed or cannot carry a path.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A response header was missing or malformed.
    #[error("invalid header {name}: {value:?}")]
    InvalidHeader {
        name: &'static str,
        value: Option<String>,
    },

    /// The client configuration is incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn unexpected_status(
        status: StatusCode,
        expected: StatusCode,
        body: impl Into<String>,
    ) -> Self {
        Error::UnexpectedStatus {
            status: status.as_u16(),
            expected: expected.as_u16(),
            body: body.into(),
        }
    }

    pub(crate) fn invalid_url(url: &Url) -> Self {
        Error::InvalidUrl(url.to_string())
    }

    /// Returns the HTTP status the provider answered with, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Error::Config(format!("credentials are not valid header values: {err}"))
    }
}
