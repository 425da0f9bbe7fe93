//! Reachability check for the page under test

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Reachability check settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilityConfig {
    pub enabled: bool,

    /// Attempts before giving up
    pub attempts: usize,

    /// Delay between attempts
    pub interval_ms: u64,

    /// Per-request timeout
    pub request_timeout_ms: u64,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            attempts: 5,
            interval_ms: 500,
            request_timeout_ms: 5000,
        }
    }
}

/// Wait until the base URL answers any HTTP response.
///
/// Status codes are not judged here; the scenarios themselves decide what a
/// given status means.
pub async fn wait_until_reachable(base_url: &str, config: &ReachabilityConfig) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()?;

    let max_attempts = config.attempts.max(1);
    let mut attempts = 0;

    while attempts < max_attempts {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) => {
                info!("Target {} reachable (status {})", base_url, resp.status());
                return Ok(());
            }
            Err(e) => {
                warn!("Attempt {}/{} to reach {} failed: {}", attempts, max_attempts, base_url, e);
            }
        }

        if attempts < max_attempts {
            sleep(Duration::from_millis(config.interval_ms)).await;
        }
    }

    Err(E2eError::TargetUnreachable {
        url: base_url.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_target_reports_attempts() {
        // Port 9 (discard) on loopback is closed on test hosts.
        let config = ReachabilityConfig {
            enabled: true,
            attempts: 2,
            interval_ms: 10,
            request_timeout_ms: 500,
        };
        let err = wait_until_reachable("http://127.0.0.1:9/", &config)
            .await
            .unwrap_err();
        match err {
            E2eError::TargetUnreachable { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once_without_trailing_sleep() {
        let config = ReachabilityConfig {
            enabled: true,
            attempts: 0,
            interval_ms: 10_000,
            request_timeout_ms: 500,
        };
        let start = std::time::Instant::now();
        let err = wait_until_reachable("http://127.0.0.1:9/", &config)
            .await
            .unwrap_err();

        assert!(matches!(err, E2eError::TargetUnreachable { attempts: 1, .. }));
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "no sleep after the final attempt (took {:?})",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_any_status_counts_as_reachable() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await;
        });

        let config = ReachabilityConfig {
            attempts: 1,
            ..Default::default()
        };
        wait_until_reachable(&format!("http://{}/", addr), &config)
            .await
            .unwrap();
    }
}
