use std::time::Duration;

pub fn default_http_client() -> reqwest::Client {
    http_client_with_timeout(None).expect("default HTTP client configuration is valid")
}

/// Build the HTTP client, optionally bounding every request by `timeout`.
pub fn http_client_with_timeout(timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
    let builder = reqwest::Client::builder().gzip(true).brotli(true);
    match timeout {
        Some(timeout) => builder.timeout(timeout).build(),
        None => builder.build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_and_without_timeout() {
        assert!(http_client_with_timeout(None).is_ok());
        assert!(http_client_with_timeout(Some(Duration::from_secs(5))).is_ok());
    }
}
