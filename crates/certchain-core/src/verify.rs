//! Certificate verification flow.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::busy::BusyFlag;
use crate::client::LedgerClient;
use crate::decode::{decode, VerificationOutcome};
use crate::error::{LedgerError, LedgerResult};
use crate::types::RawEnvelope;

/// Read-only access to `verify-certificate`.
#[async_trait]
pub trait CertificateLedger: Send + Sync {
    async fn query_certificate(&self, id: u128) -> LedgerResult<RawEnvelope>;
}

#[async_trait]
impl CertificateLedger for LedgerClient {
    async fn query_certificate(&self, id: u128) -> LedgerResult<RawEnvelope> {
        self.verify_certificate(id).await
    }
}

/// Result of one [`CertificateVerifier::verify`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// Missing or non-numeric id; no query was made.
    InputRejected,
    /// Another verification is running.
    Busy,
    /// Transport or node failure. Not distinguished from "no such
    /// certificate" in the message.
    QueryFailed(LedgerError),
    Completed(VerificationOutcome),
}

impl VerificationResult {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InputRejected => "Please enter a certificate ID",
            Self::Busy => "A verification is already in progress",
            Self::QueryFailed(_) => "Failed to verify certificate",
            Self::Completed(outcome) => outcome.message(),
        }
    }

    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        match self {
            Self::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Parse a certificate id: ASCII digits only, greater than zero.
pub fn parse_certificate_id(input: &str) -> Option<u128> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u128>().ok().filter(|id| *id > 0)
}

/// Owns the verification busy flag and the last outcome.
#[derive(Debug)]
pub struct CertificateVerifier<L> {
    ledger: L,
    busy: BusyFlag,
    last: Mutex<Option<VerificationOutcome>>,
}

impl<L: CertificateLedger> CertificateVerifier<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            busy: BusyFlag::new(),
            last: Mutex::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Outcome of the last completed query. Cleared when a query fails.
    pub fn last_outcome(&self) -> Option<VerificationOutcome> {
        self.last_slot().clone()
    }

    pub async fn verify(&self, input: &str) -> VerificationResult {
        let Some(id) = parse_certificate_id(input) else {
            debug!(input = input, "certificate id rejected");
            return VerificationResult::InputRejected;
        };

        let Some(_guard) = self.busy.try_acquire() else {
            return VerificationResult::Busy;
        };

        match self.ledger.query_certificate(id).await {
            Ok(envelope) => {
                let outcome = decode(&envelope);
                info!(
                    id = %id,
                    found = outcome.found,
                    valid = outcome.valid,
                    "certificate verified"
                );
                *self.last_slot() = Some(outcome.clone());
                VerificationResult::Completed(outcome)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "certificate query failed");
                *self.last_slot() = None;
                VerificationResult::QueryFailed(e)
            }
        }
    }

    fn last_slot(&self) -> MutexGuard<'_, Option<VerificationOutcome>> {
        self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
