//! HTTP layer: status mapping and retry.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::config::CertConfig;
use crate::error::{LedgerError, LedgerResult};

use super::helpers::{parse_contract_url, truncate_body};

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// HTTP backend for node requests (holds reqwest client and config).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) config: CertConfig,
}

impl HttpBackend {
    /// POST a JSON body and return the response text, retrying transient
    /// failures.
    pub(crate) async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> LedgerResult<String> {
        let mut retries = 0;
        let max_retries = self.config.max_retries;

        loop {
            match self.post_once(url, body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && retries < max_retries => {
                    retries += 1;
                    let backoff = backoff_for(&e, retries);

                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once(&self, url: &str, body: &serde_json::Value) -> LedgerResult<String> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "node responded");

        match status.as_u16() {
            200..=299 => response.text().await.map_err(|e| LedgerError::Network {
                message: format!("failed to read response body: {}", e),
            }),

            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(LedgerError::Contract {
                    cause: truncate_body(&text),
                })
            }

            404 => Err(LedgerError::ContractNotFound {
                contract: parse_contract_url(url),
            }),

            429 => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);

                Err(LedgerError::RateLimited { retry_after })
            }

            _ => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                Err(LedgerError::Network {
                    message: format!("HTTP {}: {}", status.as_u16(), truncate_body(&message)),
                })
            }
        }
    }
}

/// Retry-After (capped, +/-10% jitter) when given, else jittered exponential.
fn backoff_for(err: &LedgerError, attempt: u32) -> Duration {
    let mut rng = rand::thread_rng();
    match err {
        LedgerError::RateLimited {
            retry_after: Some(retry_after),
        } => {
            let base_ms = (*retry_after).min(MAX_BACKOFF).as_millis() as u64;
            let jitter: f64 = rng.gen_range(0.9_f64..=1.1_f64);
            Duration::from_millis((((base_ms as f64) * jitter).round() as u64).max(100))
        }
        _ => {
            let base = Duration::from_secs(1_u64 << attempt.min(5)).min(MAX_BACKOFF);
            let jittered_ms = rng.gen_range(0..=base.as_millis() as u64);
            Duration::from_millis(jittered_ms.max(10))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_respects_retry_after_cap() {
        let err = LedgerError::RateLimited {
            retry_after: Some(Duration::from_secs(600)),
        };
        let backoff = backoff_for(&err, 1);
        assert!(backoff >= Duration::from_millis(27_000));
        assert!(backoff <= Duration::from_millis(33_000));
    }

    #[test]
    fn test_backoff_exponential_bounds() {
        let err = LedgerError::Network {
            message: "reset".into(),
        };
        for attempt in 1..=10 {
            let backoff = backoff_for(&err, attempt);
            assert!(backoff >= Duration::from_millis(10));
            assert!(backoff <= MAX_BACKOFF);
        }
    }
}
