use thiserror::Error;

/// Every way a round trip to the address book service can fail.
///
/// Callers that only care whether the request went through can treat all
/// variants alike; the variants exist so logs and tests can tell them apart.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("the request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the request failed with status code {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("the response body could not be read: {0}")]
    ResponseBody(#[source] reqwest::Error),
    #[error("unable to parse the response body: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("unable to serialize the request body: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl RequestError {
    /// The HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(e) | RequestError::ResponseBody(e) => e.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint url `{0}`: {1}")]
    InvalidEndpoint(String, String),
    #[error("endpoint `{0}` must use http or https")]
    UnsupportedScheme(String),
}
