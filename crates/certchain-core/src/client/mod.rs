//! Ledger node client for read-only contract calls.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::json;
use tracing::debug;

use crate::clarity::ClarityValue;
use crate::config::CertConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::types::{ContractId, RawEnvelope, VERIFY_FUNCTION};

mod helpers;
mod http;

use helpers::parse_read_only_body;
use http::HttpBackend;

/// `User-Agent` sent to the node and the wallet agent.
pub const CERTCHAIN_USER_AGENT: &str = concat!("certchain/", env!("CARGO_PKG_VERSION"));

/// Read-only client for the certificate contract.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: HttpBackend,
}

impl LedgerClient {
    pub fn new(config: CertConfig) -> LedgerResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CERTCHAIN_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| LedgerError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let base_url = config.node_url();

        Ok(Self {
            http: HttpBackend {
                client,
                base_url,
                config,
            },
        })
    }

    pub fn from_env() -> LedgerResult<Self> {
        Self::new(CertConfig::from_env())
    }

    /// Evaluate a read-only function and return its decoded value.
    pub async fn call_read_only(
        &self,
        function: &str,
        args: &[ClarityValue],
    ) -> LedgerResult<ClarityValue> {
        let url = self.call_read_url(function);
        let body = json!({
            "sender": self.http.config.read_only_sender,
            "arguments": args.iter().map(ClarityValue::to_hex).collect::<Vec<_>>(),
        });
        debug!(url = %url, function = function, "calling read-only function");

        let text = self.http.post_json(&url, &body).await?;
        let hex = parse_read_only_body(&text)?;
        Ok(ClarityValue::from_hex(&hex)?)
    }

    /// `verify-certificate(id)` as a `{type, value}` envelope.
    pub async fn verify_certificate(&self, id: u128) -> LedgerResult<RawEnvelope> {
        let value = self
            .call_read_only(VERIFY_FUNCTION, &[ClarityValue::uint(id)])
            .await?;
        debug!(id = %id, tag = value.type_tag(), "verify-certificate returned");
        Ok(value.to_json())
    }

    fn call_read_url(&self, function: &str) -> String {
        let contract = self.contract();
        format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.http.base_url, contract.address, contract.name, function
        )
    }

    pub fn contract(&self) -> ContractId {
        self.http.config.contract()
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }
}
