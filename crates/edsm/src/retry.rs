use std::time::Duration;

use tracing::warn;

/// Send an HTTP request with exponential backoff.
///
/// Retries on 5xx and network errors only; success and 4xx return
/// immediately. The builder is cloned per attempt, so it must not carry a
/// streaming body.
pub async fn retry_send(
    request: reqwest::RequestBuilder,
    max_retries: u32,
) -> Result<reqwest::Response, reqwest::Error> {
    let max_attempts = max_retries + 1;

    for attempt in 0..max_attempts {
        let Some(req) = request.try_clone() else {
            return request.send().await;
        };

        match req.send().await {
            Ok(resp) if resp.status().is_server_error() && attempt + 1 < max_attempts => {
                let next_delay = 1u64 << attempt.min(4);
                warn!(
                    "request attempt {}/{} failed (HTTP {}), retrying in {next_delay}s",
                    attempt + 1,
                    max_attempts,
                    resp.status()
                );
                tokio::time::sleep(Duration::from_secs(next_delay)).await;
            }
            Ok(resp) => return Ok(resp),
            Err(e) => {
                if attempt + 1 >= max_attempts {
                    return Err(e);
                }
                let next_delay = 1u64 << attempt.min(4);
                warn!(
                    "request attempt {}/{} failed ({e}), retrying in {next_delay}s",
                    attempt + 1,
                    max_attempts
                );
                tokio::time::sleep(Duration::from_secs(next_delay)).await;
            }
        }
    }

    unreachable!()
}
