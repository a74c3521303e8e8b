//! Issuance orchestration.
//!
//! One [`IssuanceOrchestrator::submit`] call walks
//! `Idle → Validating → Encoding → AwaitingWallet` and ends in exactly one of
//! `Approved`, `Cancelled`, `TimedOut` or `Failed`. The wallet handshake is
//! raced against a timeout; whichever settles first decides, and the loser is
//! dropped so it can never report a second result.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::busy::BusyFlag;
use crate::classify;
use crate::config::{CertConfig, DEFAULT_WALLET_TIMEOUT_MS};
use crate::encode::{encode, ContractCallDescriptor, EncodeError};
use crate::types::ContractId;
use crate::validate::{validate, IssueForm, ValidationError};
use crate::wallet::{CallCompletion, WalletError, WalletResponse, WalletSession};

/// Why an issuance attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssuanceError {
    /// Every failed form rule, in rule order.
    #[error("{}", first_message(.errors))]
    Validation { errors: Vec<ValidationError> },

    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Wallet connection incomplete. Please reconnect your wallet.")]
    IncompleteConnection,

    #[error("An issuance is already in progress")]
    Busy,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

fn first_message(errors: &[ValidationError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

impl IssuanceError {
    /// Text for the user. Encoding and wallet failures are reworded by
    /// [`classify::user_message`]; the rest already are user text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Encode(_) | Self::Wallet(_) => classify::user_message(&self.to_string()),
            _ => self.to_string(),
        }
    }

    /// First failed form rule, if this is a validation failure.
    pub fn first_validation_error(&self) -> Option<ValidationError> {
        match self {
            Self::Validation { errors } => errors.first().copied(),
            _ => None,
        }
    }
}

/// Where the current (or last) attempt is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceState {
    Idle,
    Validating,
    Encoding,
    AwaitingWallet,
    Approved { tx_id: String },
    Cancelled,
    TimedOut,
    Failed(IssuanceError),
}

impl IssuanceState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Approved { .. } | Self::Cancelled | Self::TimedOut | Self::Failed(_)
        )
    }
}

/// Terminal result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceOutcome {
    Approved { tx_id: String },
    /// The user declined in the wallet. Not an error.
    Cancelled,
    /// No wallet answer within the window. The user may retry.
    TimedOut,
    Failed(IssuanceError),
}

impl IssuanceOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Approved { .. } => {
                "Certificate issued successfully! Transaction submitted to blockchain.".to_string()
            }
            Self::Cancelled => "Transaction was cancelled".to_string(),
            Self::TimedOut => "Wallet did not respond in time".to_string(),
            Self::Failed(e) => e.user_message(),
        }
    }

    pub fn tx_id(&self) -> Option<&str> {
        match self {
            Self::Approved { tx_id } => Some(tx_id),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed(IssuanceError::Wallet(_)))
    }
}

impl From<IssuanceOutcome> for IssuanceState {
    fn from(outcome: IssuanceOutcome) -> Self {
        match outcome {
            IssuanceOutcome::Approved { tx_id } => Self::Approved { tx_id },
            IssuanceOutcome::Cancelled => Self::Cancelled,
            IssuanceOutcome::TimedOut => Self::TimedOut,
            IssuanceOutcome::Failed(e) => Self::Failed(e),
        }
    }
}

/// Drives `issue-certificate` calls through the wallet.
#[derive(Debug)]
pub struct IssuanceOrchestrator {
    session: Arc<WalletSession>,
    contract: ContractId,
    timeout: Duration,
    busy: BusyFlag,
    state: watch::Sender<IssuanceState>,
}

impl IssuanceOrchestrator {
    pub fn new(session: Arc<WalletSession>, contract: ContractId) -> Self {
        let (state, _) = watch::channel(IssuanceState::Idle);
        Self {
            session,
            contract,
            timeout: Duration::from_millis(DEFAULT_WALLET_TIMEOUT_MS),
            busy: BusyFlag::new(),
            state,
        }
    }

    pub fn from_config(session: Arc<WalletSession>, config: &CertConfig) -> Self {
        Self::new(session, config.contract()).with_timeout(config.wallet_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<IssuanceState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> IssuanceState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Run one issuance attempt for `form`.
    ///
    /// `form` is reset only when the wallet approves. A second call while one
    /// is in flight fails with [`IssuanceError::Busy`] and leaves the running
    /// attempt alone.
    pub async fn submit(&self, form: &mut IssueForm) -> IssuanceOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            warn!("issuance already in progress");
            return IssuanceOutcome::Failed(IssuanceError::Busy);
        };

        self.transition(IssuanceState::Validating);
        let request = match validate(form) {
            Ok(request) => request,
            Err(errors) => {
                debug!(count = errors.len(), "issue form rejected");
                return self.settle(IssuanceOutcome::Failed(IssuanceError::Validation { errors }));
            }
        };

        match self.session.user() {
            None => return self.settle(IssuanceOutcome::Failed(IssuanceError::NotConnected)),
            Some(user) if user.profile.is_none() => {
                return self.settle(IssuanceOutcome::Failed(IssuanceError::IncompleteConnection));
            }
            Some(_) => {}
        }

        self.transition(IssuanceState::Encoding);
        let args = match encode(&request) {
            Ok(args) => args,
            Err(e) => return self.settle(IssuanceOutcome::Failed(e.into())),
        };
        let descriptor = ContractCallDescriptor::issue_certificate(
            &self.contract,
            args,
            self.session.network(),
            self.session.app_details().clone(),
        );

        self.transition(IssuanceState::AwaitingWallet);
        let outcome = self.await_wallet(descriptor).await;

        if matches!(outcome, IssuanceOutcome::Approved { .. }) {
            form.reset();
        }
        self.settle(outcome)
    }

    async fn await_wallet(&self, descriptor: ContractCallDescriptor) -> IssuanceOutcome {
        let (completion, response) = CallCompletion::channel();
        let agent = Arc::clone(self.session.agent());

        let handshake = async move {
            agent.open_contract_call(descriptor, completion).await?;
            response.await.map_err(|_| WalletError::Closed)
        };

        // Timing out drops the handshake, and with it the receiver, so a
        // late settlement has nowhere to go.
        match tokio::time::timeout(self.timeout, handshake).await {
            Ok(Ok(WalletResponse::Finish(data))) => IssuanceOutcome::Approved {
                tx_id: data.resolved_tx_id(),
            },
            Ok(Ok(WalletResponse::Cancel)) => IssuanceOutcome::Cancelled,
            Ok(Err(e)) => IssuanceOutcome::Failed(e.into()),
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "wallet did not respond in time"
                );
                IssuanceOutcome::TimedOut
            }
        }
    }

    fn transition(&self, state: IssuanceState) {
        debug!(state = ?state, "issuance state");
        self.state.send_replace(state);
    }

    fn settle(&self, outcome: IssuanceOutcome) -> IssuanceOutcome {
        match &outcome {
            IssuanceOutcome::Approved { tx_id } => info!(tx_id = %tx_id, "certificate issuance submitted"),
            IssuanceOutcome::Cancelled => info!("issuance cancelled in wallet"),
            IssuanceOutcome::TimedOut => {}
            IssuanceOutcome::Failed(e) => warn!(error = %e, "issuance failed"),
        }
        self.transition(outcome.clone().into());
        outcome
    }
}
