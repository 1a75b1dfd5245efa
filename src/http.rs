//! Single-attempt HTTP GET shared by the feed, quote and price-history clients.

use futures::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::IntoUrl;
use std::time::Duration;
use thiserror::Error;

/// Responses larger than this are refused.
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Some publishers refuse unfamiliar agents outright, so present as a browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Errors from a single remote call.
///
/// Any of these marks that one unit (feed, symbol) as failed; none of them
/// aborts a run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.), URL stripped
    #[error("Request failed: {0}")]
    Network(reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Server answered 2xx with nothing in the body
    #[error("Empty response body")]
    EmptyBody,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Body could not be parsed as the expected format
    #[error("Parse error: {0}")]
    Parse(String),
}

// Request URLs may carry API tokens; the URL is dropped before the error is kept.
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e.without_url())
    }
}

/// Builds the shared client. `timeout` also bounds connection setup.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Performs one GET and returns the body bytes.
///
/// The whole exchange (send + body read) is bounded by `timeout`. Non-2xx
/// statuses, empty bodies and bodies over [`MAX_BODY_SIZE`] are errors.
pub async fn get_bytes(
    client: &reqwest::Client,
    url: impl IntoUrl,
    accept: &'static str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    let request = client
        .get(url)
        .header(ACCEPT, HeaderValue::from_static(accept));

    let bytes = tokio::time::timeout(timeout, send_and_read(request))
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(|e| match e {
            FetchError::Network(inner) if inner.is_timeout() => FetchError::Timeout,
            other => other,
        })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::EmptyBody);
    }
    Ok(bytes)
}

async fn send_and_read(request: reqwest::RequestBuilder) -> Result<Vec<u8>, FetchError> {
    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }
    read_limited_bytes(response, MAX_BODY_SIZE).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> reqwest::Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_bytes_success_sends_accept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = get_bytes(
            &client(),
            format!("{}/data", server.uri()),
            "application/json",
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[tokio::test]
    async fn test_get_bytes_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1) // single attempt, no retry
            .mount(&server)
            .await;

        let err = get_bytes(&client(), server.uri(), "*/*", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(403)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_get_bytes_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&server)
            .await;

        let err = get_bytes(&client(), server.uri(), "*/*", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::EmptyBody), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_network_error_omits_query() {
        // Nothing listens on port 1
        let err = get_bytes(
            &client(),
            "http://127.0.0.1:1/quote?symbol=MCD&token=SUPERSECRET123",
            "application/json",
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {:?}", err);
        assert!(!err.to_string().contains("SUPERSECRET123"));
        assert!(!format!("{:?}", err).contains("SUPERSECRET123"));
    }

    #[tokio::test]
    async fn test_get_bytes_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = get_bytes(&client(), server.uri(), "*/*", Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout), "got {:?}", err);
    }
}
