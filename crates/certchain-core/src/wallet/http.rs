//! HTTP bridge to a local wallet agent process.
//!
//! `GET /session` returns the signed-in user (404 or 204 when there is none).
//! `POST /contract-call` blocks until the user decides and answers
//! `{"status":"finish","data":{..}}` or `{"status":"cancel"}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{CallCompletion, FinishData, UserData, WalletAgent, WalletError, WalletResult};
use crate::client::CERTCHAIN_USER_AGENT;
use crate::encode::ContractCallDescriptor;

/// Wallet agent reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWalletAgent {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWalletAgent {
    /// No overall request timeout: the contract-call request stays open while
    /// the user decides, and the issuance flow bounds it.
    pub fn new(base_url: &str) -> WalletResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CERTCHAIN_USER_AGENT));

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .default_headers(default_headers)
            .build()
            .map_err(|e| WalletError::Unavailable {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WalletAgent for HttpWalletAgent {
    async fn open_contract_call(
        &self,
        descriptor: ContractCallDescriptor,
        completion: CallCompletion,
    ) -> WalletResult<()> {
        let url = format!("{}/contract-call", self.base_url);
        debug!(url = %url, function = %descriptor.function_name, "opening contract call");

        let response = self.client.post(&url).json(&descriptor).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(agent_error(status, &body));
        }

        match parse_contract_call_reply(&body)? {
            Some(data) => {
                info!(tx_id = %data.resolved_tx_id(), "wallet approved contract call");
                completion.finish(data);
            }
            None => {
                info!("wallet cancelled contract call");
                completion.cancel();
            }
        }
        Ok(())
    }

    async fn load_user_data(&self) -> WalletResult<Option<UserData>> {
        let url = format!("{}/session", self.base_url);
        debug!(url = %url, "loading wallet session");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            s if s.is_success() => {
                let user: Option<UserData> =
                    response.json().await.map_err(|e| WalletError::Agent {
                        message: format!("invalid wallet session: {}", e),
                    })?;
                Ok(user)
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(agent_error(status, &body))
            }
        }
    }
}

/// `Some(data)` on approval, `None` on cancel.
fn parse_contract_call_reply(body: &str) -> WalletResult<Option<FinishData>> {
    let reply: Value = serde_json::from_str(body).map_err(|e| WalletError::Agent {
        message: format!("invalid wallet reply: {}", e),
    })?;

    match reply.get("status").and_then(Value::as_str) {
        Some("finish") => {
            let data = reply.get("data").cloned().unwrap_or(Value::Null);
            // The wallet already approved; an odd payload only loses the id.
            let data = match data {
                Value::Null => FinishData::default(),
                other => serde_json::from_value(other).unwrap_or_else(|e| {
                    warn!(error = %e, "unreadable wallet finish data");
                    FinishData::default()
                }),
            };
            Ok(Some(data))
        }
        Some("cancel") => Ok(None),
        other => Err(WalletError::Agent {
            message: format!("unexpected wallet reply status: {:?}", other),
        }),
    }
}

/// Prefer the agent's own `error` text so it can be classified.
fn agent_error(status: StatusCode, body: &str) -> WalletError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
        .or_else(|| (!body.trim().is_empty()).then(|| body.chars().take(200).collect()))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    WalletError::Agent { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{WalletResponse, UNKNOWN_TX_ID};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn descriptor() -> ContractCallDescriptor {
        use crate::encode::encode;
        use crate::types::{AppDetails, ContractId, Network};
        use crate::validate::{validate, IssueForm};

        let request = validate(&IssueForm::new(
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            "B.Tech CS",
            "NIT Rourkela",
            "365",
        ))
        .unwrap();
        ContractCallDescriptor::issue_certificate(
            &ContractId::new("ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4", "cert-dapp"),
            encode(&request).unwrap(),
            Network::Testnet,
            AppDetails::default(),
        )
    }

    #[test]
    fn test_parse_reply() {
        let data = parse_contract_call_reply(r#"{"status":"finish","data":{"transactionId":"0xab"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(data.resolved_tx_id(), "0xab");

        assert_eq!(parse_contract_call_reply(r#"{"status":"cancel"}"#).unwrap(), None);
        assert!(parse_contract_call_reply(r#"{"status":"pending"}"#).is_err());
        assert!(parse_contract_call_reply("not json").is_err());
    }

    #[test]
    fn test_parse_reply_keeps_approval_with_odd_fields() {
        let data = parse_contract_call_reply(
            r#"{"status":"finish","data":{"txId":"0xabc","tx":{"raw":"0011"}}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(data.resolved_tx_id(), "0xabc");

        let data =
            parse_contract_call_reply(r#"{"status":"finish","data":{"txId":null,"transactionId":12345}}"#)
                .unwrap()
                .unwrap();
        assert_eq!(data.resolved_tx_id(), UNKNOWN_TX_ID);

        let data = parse_contract_call_reply(r#"{"status":"finish","data":"0xabc"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(data.resolved_tx_id(), UNKNOWN_TX_ID);
    }

    #[test]
    fn test_agent_error_message() {
        let err = agent_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"User denied transaction signature"}"#,
        );
        assert_eq!(err.to_string(), "User denied transaction signature");

        let err = agent_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[tokio::test]
    async fn test_open_contract_call_finish() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contract-call"))
            .and(body_partial_json(serde_json::json!({
                "functionName": "issue-certificate",
                "contractName": "cert-dapp"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "finish", "data": {"txId": "0x01"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let agent = HttpWalletAgent::new(&server.uri()).unwrap();
        let (completion, receiver) = CallCompletion::channel();
        agent.open_contract_call(descriptor(), completion).await.unwrap();

        match receiver.await.unwrap() {
            WalletResponse::Finish(data) => assert_eq!(data.resolved_tx_id(), "0x01"),
            other => panic!("expected finish, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_user_data_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let agent = HttpWalletAgent::new(&server.uri()).unwrap();
        assert_eq!(agent.load_user_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_agent_is_wallet_error() {
        // Nothing listens on port 9 locally.
        let agent = HttpWalletAgent::new("http://127.0.0.1:9").unwrap();
        let err = agent.load_user_data().await.unwrap_err();
        assert!(matches!(err, WalletError::Unavailable { .. }));
        assert!(err.to_string().contains("wallet"));
    }
}
