use serde::Deserialize;

/// Raw acknowledgement returned by create, update and delete.
#[derive(Debug, Deserialize)]
pub struct Response {
    pub message: String,
}
