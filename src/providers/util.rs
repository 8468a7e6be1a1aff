use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async request with a fixed delay between attempts.
///
/// `retries` counts the extra attempts, so the operation runs at most
/// `retries + 1` times. The last error is returned when every attempt fails.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) if attempt < retries && is_retryable(&err) => {
                attempt += 1;
                debug!(attempt, retries, error = %err, "Request failed, retrying");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

// Client errors (4xx) will not change on retry
fn is_retryable(err: &reqwest::Error) -> bool {
    err.status().is_none_or(|status| !status.is_client_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_retries_server_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let url = format!("{}/flaky", mock_server.uri());
        let result = with_retry(
            || async { reqwest::get(&url).await?.error_for_status() },
            2,
            1,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing", mock_server.uri());
        let result = with_retry(
            || async { reqwest::get(&url).await?.error_for_status() },
            3,
            1,
        )
        .await;
        assert!(result.is_err());
    }
}
