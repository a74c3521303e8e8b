//! Pure helpers: URL parsing and read-only response bodies (no HTTP, no status logic).

use serde::Deserialize;

use crate::error::{LedgerError, LedgerResult};

/// Parse `address.name` from a call-read URL.
///
/// URL format: .../v2/contracts/call-read/{address}/{name}/{function}
pub(crate) fn parse_contract_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();

    match parts.iter().position(|p| *p == "call-read") {
        Some(i) if parts.len() > i + 2 => format!("{}.{}", parts[i + 1], parts[i + 2]),
        _ => "unknown".to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ReadOnlyBody {
    okay: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    cause: Option<String>,
}

/// Parse a read-only call body into the result hex.
///
/// Expected format: `{"okay": true, "result": "0x..."}` or
/// `{"okay": false, "cause": "..."}`.
pub(crate) fn parse_read_only_body(body: &str) -> LedgerResult<String> {
    let parsed: ReadOnlyBody =
        serde_json::from_str(body).map_err(|e| LedgerError::InvalidResponse {
            message: format!("failed to parse read-only response: {}", e),
        })?;

    if !parsed.okay {
        return Err(LedgerError::Contract {
            cause: parsed
                .cause
                .unwrap_or_else(|| "no cause provided".to_string()),
        });
    }

    parsed.result.ok_or_else(|| LedgerError::InvalidResponse {
        message: "read-only response is missing result".to_string(),
    })
}

/// Trim an error body for inclusion in a message.
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contract_url() {
        let url = "https://api.testnet.hiro.so/v2/contracts/call-read/ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4/cert-dapp/verify-certificate";
        assert_eq!(
            parse_contract_url(url),
            "ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4.cert-dapp"
        );
        assert_eq!(parse_contract_url("https://node/v2/info"), "unknown");
    }

    #[test]
    fn test_parse_read_only_body_ok() {
        let hex = parse_read_only_body(r#"{"okay":true,"result":"0x0703"}"#).unwrap();
        assert_eq!(hex, "0x0703");
    }

    #[test]
    fn test_parse_read_only_body_failure() {
        let err = parse_read_only_body(
            r#"{"okay":false,"cause":"Unchecked(NoSuchPublicFunction(\"x\"))"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Contract { ref cause } if cause.contains("NoSuch")));

        let err = parse_read_only_body(r#"{"okay":true}"#).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidResponse { .. }));

        let err = parse_read_only_body("<html>").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidResponse { .. }));
    }
}
