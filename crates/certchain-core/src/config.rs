//! Deployment configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::{AppDetails, ContractId, Network};

/// Default wallet response window for an issuance.
pub const DEFAULT_WALLET_TIMEOUT_MS: u64 = 10_000;

/// Certificate contract deployment and client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertConfig {
    /// Ledger network.
    #[serde(default)]
    pub network: Network,

    /// Node API base URL. Falls back to the network default.
    #[serde(default)]
    pub node_url: Option<String>,

    /// Contract deployer address.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Contract name.
    #[serde(default = "default_contract_name")]
    pub contract_name: String,

    /// Sender identity for read-only calls. Not a secret; no signature is made.
    #[serde(default = "default_read_only_sender")]
    pub read_only_sender: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// How long to wait for the wallet to approve or reject a call.
    #[serde(default = "default_wallet_timeout_ms")]
    pub wallet_timeout_ms: u64,

    /// Wallet agent bridge URL.
    #[serde(default = "default_wallet_url")]
    pub wallet_url: String,

    /// App metadata shown by the wallet.
    #[serde(default)]
    pub app: AppDetails,
}

fn default_contract_address() -> String {
    "ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4".to_string()
}

fn default_contract_name() -> String {
    "cert-dapp".to_string()
}

fn default_read_only_sender() -> String {
    "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_wallet_timeout_ms() -> u64 {
    DEFAULT_WALLET_TIMEOUT_MS
}

fn default_wallet_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

impl Default for CertConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            node_url: None,
            contract_address: default_contract_address(),
            contract_name: default_contract_name(),
            read_only_sender: default_read_only_sender(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            wallet_timeout_ms: default_wallet_timeout_ms(),
            wallet_url: default_wallet_url(),
            app: AppDetails::default(),
        }
    }
}

impl CertConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `CERTCHAIN_NETWORK` | `mainnet`, `testnet` or `devnet` |
    /// | `CERTCHAIN_NODE_URL` | Node API base URL |
    /// | `CERTCHAIN_CONTRACT_ADDRESS` | Contract deployer address |
    /// | `CERTCHAIN_CONTRACT_NAME` | Contract name |
    /// | `CERTCHAIN_READ_ONLY_SENDER` | Sender for read-only calls |
    /// | `CERTCHAIN_TIMEOUT` | Request timeout in seconds |
    /// | `CERTCHAIN_MAX_RETRIES` | Max retries for transient failures |
    /// | `CERTCHAIN_WALLET_TIMEOUT_MS` | Wallet response window |
    /// | `CERTCHAIN_WALLET_URL` | Wallet agent bridge URL |
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a YAML file; environment variables still take precedence.
    pub fn from_yaml_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(config.with_env_overrides())
    }

    /// Apply `CERTCHAIN_*` variables on top of the current values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(network) = env_var("CERTCHAIN_NETWORK").and_then(|v| v.parse().ok()) {
            self.network = network;
        }
        if let Some(url) = env_var("CERTCHAIN_NODE_URL") {
            self.node_url = Some(url);
        }
        if let Some(address) = env_var("CERTCHAIN_CONTRACT_ADDRESS") {
            self.contract_address = address;
        }
        if let Some(name) = env_var("CERTCHAIN_CONTRACT_NAME") {
            self.contract_name = name;
        }
        if let Some(sender) = env_var("CERTCHAIN_READ_ONLY_SENDER") {
            self.read_only_sender = sender;
        }
        if let Some(timeout) = env_var("CERTCHAIN_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.timeout_secs = timeout;
        }
        if let Some(retries) = env_var("CERTCHAIN_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            self.max_retries = retries;
        }
        if let Some(ms) = env_var("CERTCHAIN_WALLET_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.wallet_timeout_ms = ms;
        }
        if let Some(url) = env_var("CERTCHAIN_WALLET_URL") {
            self.wallet_url = url;
        }
        self
    }

    /// Effective node URL without a trailing slash.
    pub fn node_url(&self) -> String {
        self.node_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_node_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn contract(&self) -> ContractId {
        ContractId::new(&self.contract_address, &self.contract_name)
    }

    pub fn wallet_timeout(&self) -> Duration {
        Duration::from_millis(self.wallet_timeout_ms)
    }

    /// Check the values a client cannot work without.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("node_url", self.node_url()),
            ("wallet_url", self.wallet_url.clone()),
        ] {
            url::Url::parse(&value).map_err(|e| ConfigError::Invalid {
                field,
                message: format!("{value}: {e}"),
            })?;
        }

        if self.contract_address.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "contract_address",
                message: "must not be empty".to_string(),
            });
        }

        if self.contract_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "contract_name",
                message: "must not be empty".to_string(),
            });
        }

        if self.wallet_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "wallet_timeout_ms",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_node_url(mut self, url: impl Into<String>) -> Self {
        self.node_url = Some(url.into());
        self
    }

    pub fn with_contract(mut self, address: impl Into<String>, name: impl Into<String>) -> Self {
        self.contract_address = address.into();
        self.contract_name = name.into();
        self
    }

    pub fn with_wallet_url(mut self, url: impl Into<String>) -> Self {
        self.wallet_url = url.into();
        self
    }

    pub fn with_wallet_timeout(mut self, timeout: Duration) -> Self {
        self.wallet_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
