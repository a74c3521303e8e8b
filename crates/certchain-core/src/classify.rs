//! Advisory wording for issuance failures.
//!
//! Matching is on message text and only picks friendlier wording. It never
//! changes which outcome was reported.

/// Failure family recognised in an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UserDenied,
    AddressChecksum,
    WalletUnavailable,
    Network,
    Contract,
    PrincipalFormat,
    Other,
}

/// Case-sensitive substring patterns, first match wins.
const PATTERNS: &[(&str, FailureKind)] = &[
    ("User denied", FailureKind::UserDenied),
    ("checksum mismatch", FailureKind::AddressChecksum),
    ("wallet", FailureKind::WalletUnavailable),
    ("network", FailureKind::Network),
    ("contract", FailureKind::Contract),
    ("principal", FailureKind::PrincipalFormat),
];

pub fn classify(message: &str) -> FailureKind {
    PATTERNS
        .iter()
        .find(|(pattern, _)| message.contains(pattern))
        .map(|(_, kind)| *kind)
        .unwrap_or(FailureKind::Other)
}

/// Message to show for a failure with the given raw text.
pub fn user_message(message: &str) -> String {
    if message.trim().is_empty() {
        return "Failed to issue certificate".to_string();
    }

    let text = match classify(message) {
        FailureKind::UserDenied => "Transaction was cancelled by user",
        FailureKind::AddressChecksum => {
            "Invalid Stacks address format. Please check the address and try again."
        }
        FailureKind::WalletUnavailable => {
            "Wallet error. Please make sure your wallet is installed and connected."
        }
        FailureKind::Network => "Network error. Please check your connection and try again.",
        FailureKind::Contract => "Smart contract error. Please verify contract details.",
        FailureKind::PrincipalFormat => {
            "Invalid address format. Please enter a valid Stacks address."
        }
        FailureKind::Other => return format!("Error: {message}"),
    };
    text.to_string()
}
