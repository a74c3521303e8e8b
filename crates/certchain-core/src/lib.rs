//! Certificate issuance and verification against a ledger contract.
//!
//! This crate implements the client side of the `cert-dapp` contract:
//!
//! - Issue form validation and contract argument encoding
//! - Wallet handshake for `issue-certificate`, raced against a timeout
//! - Read-only `verify-certificate` queries against a node
//! - Decoding of the nested `{type, value}` response into a flat verdict
//! - The ledger value codec and c32check principals underneath
//!
//! # Quick Start
//!
//! ```no_run
//! use certchain_core::{CertificateVerifier, LedgerClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let verifier = CertificateVerifier::new(LedgerClient::from_env()?);
//!
//! let result = verifier.verify("1").await;
//! println!("{}", result.message());
//! if let Some(cert) = result.outcome().and_then(|o| o.detail.as_ref()) {
//!     println!("{} at {}", cert.course_name, cert.organization);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `CERTCHAIN_NETWORK` | `mainnet`, `testnet` or `devnet` (default: `testnet`) |
//! | `CERTCHAIN_NODE_URL` | Node API base URL (default: per network) |
//! | `CERTCHAIN_CONTRACT_ADDRESS` | Contract deployer address |
//! | `CERTCHAIN_CONTRACT_NAME` | Contract name (default: `cert-dapp`) |
//! | `CERTCHAIN_READ_ONLY_SENDER` | Sender for read-only calls |
//! | `CERTCHAIN_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `CERTCHAIN_MAX_RETRIES` | Max retries for transient failures (default: 3) |
//! | `CERTCHAIN_WALLET_TIMEOUT_MS` | Wallet response window (default: 10000) |
//! | `CERTCHAIN_WALLET_URL` | Wallet agent bridge (default: `http://127.0.0.1:8787`) |

mod busy;
pub mod clarity;
pub mod classify;
pub mod client;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod issue;
pub mod types;
pub mod validate;
pub mod verify;
pub mod wallet;

// Re-export main types
pub use clarity::{ClarityValue, Principal, PrincipalError, StandardPrincipal, WireError};
pub use classify::{classify, FailureKind};
pub use client::{LedgerClient, CERTCHAIN_USER_AGENT};
pub use config::CertConfig;
pub use decode::{decode, DecodeErrorKind, VerificationOutcome};
pub use encode::{encode, ContractCallDescriptor, EncodeError, IssueArguments};
pub use error::{ConfigError, ConfigResult, LedgerError, LedgerResult};
pub use issue::{IssuanceError, IssuanceOrchestrator, IssuanceOutcome, IssuanceState};
pub use types::{
    block_label, AppDetails, Certificate, ContractId, Network, RawEnvelope, ISSUE_FUNCTION,
    VERIFY_FUNCTION,
};
pub use validate::{validate, CertificateRequest, IssueForm, ValidationError};
pub use verify::{parse_certificate_id, CertificateLedger, CertificateVerifier, VerificationResult};
pub use wallet::{
    CallCompletion, FinishData, HttpWalletAgent, UserData, WalletAgent, WalletError,
    WalletResponse, WalletSession, UNKNOWN_TX_ID,
};
