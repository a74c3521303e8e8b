//! Shared data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Write function on the certificate contract.
pub const ISSUE_FUNCTION: &str = "issue-certificate";

/// Read-only function on the certificate contract.
pub const VERIFY_FUNCTION: &str = "verify-certificate";

/// A ledger value in the SDK's `{type, value}` JSON shape.
///
/// Responses stay untyped until the decoder walks them.
pub type RawEnvelope = serde_json::Value;

/// A certificate as recorded on the ledger.
///
/// `issued_at` and `expiry` are block heights, not timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub student: String,
    pub course_name: String,
    pub organization: String,
    pub issuer: String,
    pub issued_at: u128,
    pub expiry: u128,
}

impl Certificate {
    pub fn issued_at_label(&self) -> String {
        block_label(self.issued_at)
    }

    pub fn expiry_label(&self) -> String {
        block_label(self.expiry)
    }
}

/// Block heights are shown as heights, never converted to dates.
pub fn block_label(height: u128) -> String {
    format!("Block #{height}")
}

/// Deployed contract identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractId {
    pub address: String,
    pub name: String,
}

impl ContractId {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}

/// Ledger network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    /// Default node API for the network.
    pub fn default_node_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.hiro.so",
            Self::Testnet => "https://api.testnet.hiro.so",
            Self::Devnet => "http://localhost:3999",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" | "mocknet" => Ok(Self::Devnet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// App metadata shown by the wallet when it asks the user to approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDetails {
    pub name: String,
    pub icon: String,
}

impl Default for AppDetails {
    fn default() -> Self {
        Self {
            name: "Certificate DApp".to_string(),
            icon: "https://cryptologos.cc/logos/stacks-stx-logo.png".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parse() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("mocknet".parse::<Network>().unwrap(), Network::Devnet);
        assert!("moonnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_block_label() {
        assert_eq!(block_label(1365), "Block #1365");
    }

    #[test]
    fn test_contract_id_display() {
        let id = ContractId::new("ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4", "cert-dapp");
        assert_eq!(
            id.to_string(),
            "ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4.cert-dapp"
        );
    }
}
