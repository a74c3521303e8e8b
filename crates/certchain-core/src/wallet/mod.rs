//! Wallet boundary.
//!
//! The wallet is an external agent that prompts the user to approve a
//! contract call. The core only sees the request/response contract:
//! [`WalletAgent::open_contract_call`] hands over a descriptor and a
//! [`CallCompletion`], and the agent settles the completion at most once
//! with [`CallCompletion::finish`] or [`CallCompletion::cancel`].

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::encode::ContractCallDescriptor;
use crate::types::{AppDetails, Network};

mod http;

pub use http::HttpWalletAgent;

/// Transaction id reported when the wallet names none.
pub const UNKNOWN_TX_ID: &str = "unknown";

/// Wallet boundary errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The agent could not be reached.
    #[error("wallet unavailable: {message}")]
    Unavailable { message: String },

    /// The agent answered with an error of its own.
    #[error("{message}")]
    Agent { message: String },

    /// The completion was dropped without being settled.
    #[error("wallet closed the request without responding")]
    Closed,
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }
}

pub type WalletResult<T> = Result<T, WalletError>;

/// Success payload. Wallet implementations disagree on the field name for
/// the transaction id, so all known spellings are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinishData {
    #[serde(
        rename = "txId",
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub tx_id: Option<String>,

    #[serde(
        rename = "transactionId",
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub tx: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FinishData {
    pub fn with_tx_id(tx_id: impl Into<String>) -> Self {
        Self {
            tx_id: Some(tx_id.into()),
            ..Self::default()
        }
    }

    /// First non-empty of `txId`, `transactionId`, `tx`; otherwise
    /// [`UNKNOWN_TX_ID`].
    pub fn resolved_tx_id(&self) -> String {
        [&self.tx_id, &self.transaction_id, &self.tx]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_TX_ID.to_string())
    }
}

/// Id fields of any other JSON type are treated as absent.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// How the wallet settled a call.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletResponse {
    Finish(FinishData),
    Cancel,
}

/// One-shot success/cancel callback for a contract call.
#[derive(Debug)]
pub struct CallCompletion {
    sender: oneshot::Sender<WalletResponse>,
}

impl CallCompletion {
    /// A completion and the receiver that observes it.
    pub fn channel() -> (Self, oneshot::Receiver<WalletResponse>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Report approval. Returns false if nobody is waiting any more.
    pub fn finish(self, data: FinishData) -> bool {
        self.settle(WalletResponse::Finish(data))
    }

    /// Report that the user declined. Returns false if nobody is waiting.
    pub fn cancel(self) -> bool {
        self.settle(WalletResponse::Cancel)
    }

    fn settle(self, response: WalletResponse) -> bool {
        let delivered = self.sender.send(response).is_ok();
        if !delivered {
            debug!("wallet settled after the caller stopped waiting; discarded");
        }
        delivered
    }
}

/// Addresses of the connected account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StxAddress {
    #[serde(default)]
    pub testnet: Option<String>,
    #[serde(default)]
    pub mainnet: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "stxAddress", default)]
    pub stx_address: StxAddress,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Signed-in wallet user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub profile: Option<Profile>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserData {
    pub fn with_profile(testnet: impl Into<String>, mainnet: impl Into<String>) -> Self {
        Self {
            profile: Some(Profile {
                stx_address: StxAddress {
                    testnet: Some(testnet.into()),
                    mainnet: Some(mainnet.into()),
                },
                extra: Default::default(),
            }),
            extra: Default::default(),
        }
    }

    /// Account address on `network`. Devnet uses the testnet address.
    pub fn address(&self, network: Network) -> Option<&str> {
        let addresses = &self.profile.as_ref()?.stx_address;
        match network {
            Network::Mainnet => addresses.mainnet.as_deref(),
            Network::Testnet | Network::Devnet => addresses.testnet.as_deref(),
        }
    }
}

/// External wallet agent.
#[async_trait]
pub trait WalletAgent: Send + Sync {
    /// Ask the user to approve `descriptor`.
    ///
    /// Returning `Ok` means the prompt was opened; the outcome arrives via
    /// `completion`, possibly much later or never.
    async fn open_contract_call(
        &self,
        descriptor: ContractCallDescriptor,
        completion: CallCompletion,
    ) -> WalletResult<()>;

    /// The signed-in user, if any.
    async fn load_user_data(&self) -> WalletResult<Option<UserData>>;
}

/// One logical wallet session for the application.
///
/// Built once at start-up and shared (usually behind an `Arc`) by everything
/// that talks to the wallet.
pub struct WalletSession {
    agent: Arc<dyn WalletAgent>,
    network: Network,
    app_details: AppDetails,
    user: Mutex<Option<UserData>>,
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("network", &self.network)
            .field("app_details", &self.app_details)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl WalletSession {
    /// A session with no user loaded yet.
    pub fn new(agent: Arc<dyn WalletAgent>, network: Network, app_details: AppDetails) -> Self {
        Self {
            agent,
            network,
            app_details,
            user: Mutex::new(None),
        }
    }

    pub fn with_user(self, user: UserData) -> Self {
        *self.user_slot() = Some(user);
        self
    }

    /// Load the signed-in user from the agent.
    pub async fn connect(&self) -> WalletResult<Option<UserData>> {
        let user = self.agent.load_user_data().await?;
        match &user {
            Some(u) => info!(address = ?u.address(self.network), "wallet connected"),
            None => info!("no wallet session"),
        }
        *self.user_slot() = user.clone();
        Ok(user)
    }

    pub fn disconnect(&self) {
        *self.user_slot() = None;
    }

    pub fn user(&self) -> Option<UserData> {
        self.user_slot().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.user_slot().is_some()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn app_details(&self) -> &AppDetails {
        &self.app_details
    }

    pub fn agent(&self) -> &Arc<dyn WalletAgent> {
        &self.agent
    }

    fn user_slot(&self) -> MutexGuard<'_, Option<UserData>> {
        self.user.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tx_id_fallback_order() {
        let data: FinishData =
            serde_json::from_value(json!({ "txId": "0xaa", "transactionId": "0xbb" })).unwrap();
        assert_eq!(data.resolved_tx_id(), "0xaa");

        let data: FinishData =
            serde_json::from_value(json!({ "txId": "", "transactionId": "0xbb", "tx": "0xcc" }))
                .unwrap();
        assert_eq!(data.resolved_tx_id(), "0xbb");

        let data: FinishData = serde_json::from_value(json!({ "tx": "0xcc" })).unwrap();
        assert_eq!(data.resolved_tx_id(), "0xcc");

        let data: FinishData = serde_json::from_value(json!({ "txRaw": "00ff" })).unwrap();
        assert_eq!(data.resolved_tx_id(), UNKNOWN_TX_ID);
        assert_eq!(data.extra["txRaw"], "00ff");
    }

    #[test]
    fn test_tx_id_ignores_non_string_fields() {
        let data: FinishData =
            serde_json::from_value(json!({ "txId": "0xabc", "tx": { "raw": "0011" } })).unwrap();
        assert_eq!(data.resolved_tx_id(), "0xabc");
        assert_eq!(data.tx, None);

        let data: FinishData =
            serde_json::from_value(json!({ "txId": null, "transactionId": 12345, "tx": "0xcc" }))
                .unwrap();
        assert_eq!(data.resolved_tx_id(), "0xcc");

        let data: FinishData =
            serde_json::from_value(json!({ "txId": false, "transactionId": ["0xdd"] })).unwrap();
        assert_eq!(data.resolved_tx_id(), UNKNOWN_TX_ID);
    }

    #[test]
    fn test_completion_settles_once() {
        let (completion, mut receiver) = CallCompletion::channel();
        assert!(completion.cancel());
        assert_eq!(receiver.try_recv().unwrap(), WalletResponse::Cancel);
    }

    #[test]
    fn test_completion_after_receiver_dropped() {
        let (completion, receiver) = CallCompletion::channel();
        drop(receiver);
        assert!(!completion.finish(FinishData::with_tx_id("0x01")));
    }

    #[test]
    fn test_user_data_shapes() {
        let user: UserData = serde_json::from_value(json!({
            "appPrivateKey": "redacted",
            "profile": { "stxAddress": { "testnet": "ST1", "mainnet": "SP1" } }
        }))
        .unwrap();
        assert_eq!(user.address(Network::Mainnet), Some("SP1"));
        assert_eq!(user.address(Network::Devnet), Some("ST1"));
        assert!(user.extra.contains_key("appPrivateKey"));

        let user: UserData = serde_json::from_value(json!({ "profile": null })).unwrap();
        assert!(user.profile.is_none());
        assert_eq!(user.address(Network::Testnet), None);
    }
}
