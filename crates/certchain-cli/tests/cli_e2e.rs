//! End-to-end tests for the `certchain` binary.
//!
//! Every run gets an empty config dir and no `CERTCHAIN_*` variables so a
//! developer's local setup cannot leak in.

#![allow(deprecated)]

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STUDENT: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const VERIFY_PATH: &str =
    "/v2/contracts/call-read/ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4/cert-dapp/verify-certificate";

const FULL: &str = "0x070c000000030764657461696c730a0c000000060b636f757273652d6e616d650e00000009422e54656368204353066578706972790100000000000000000000000000000555096973737565642d617401000000000000000000000000000003e806697373756572051ac91004fbe8c589b5c9bc0bf1bc2a614937d292b90c6f7267616e697a6174696f6e0e0000000c4e495420526f75726b656c610773747564656e74051a6d78de7b0625dfbfc16c3a8a5735f6dc3dc3f2ce06726561736f6e090576616c696403";
const ERR_U404: &str = "0x080100000000000000000000000000000194";

const ENV_VARS: &[&str] = &[
    "CERTCHAIN_NETWORK",
    "CERTCHAIN_NODE_URL",
    "CERTCHAIN_CONTRACT_ADDRESS",
    "CERTCHAIN_CONTRACT_NAME",
    "CERTCHAIN_READ_ONLY_SENDER",
    "CERTCHAIN_TIMEOUT",
    "CERTCHAIN_MAX_RETRIES",
    "CERTCHAIN_WALLET_TIMEOUT_MS",
    "CERTCHAIN_WALLET_URL",
    "RUST_LOG",
];

fn certchain(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("certchain").expect("certchain binary");
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn decode_full_hex_from_file() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("response.hex");
    fs::write(&input, format!("{FULL}\n")).unwrap();

    certchain(&home)
        .arg("decode")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Certificate found successfully!"))
        .stdout(predicate::str::contains("Certificate Valid"))
        .stdout(predicate::str::contains("Block #1000"))
        .stdout(predicate::str::contains("Block #1365"))
        .stdout(predicate::str::contains(STUDENT));
}

#[test]
fn decode_err_envelope_from_stdin_is_not_found() {
    let home = TempDir::new().unwrap();
    let envelope = json!({ "type": "err", "value": { "type": "uint", "value": "404" } });

    certchain(&home)
        .arg("decode")
        .write_stdin(envelope.to_string())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Certificate not found"));
}

#[test]
fn decode_json_output_carries_fields() {
    let home = TempDir::new().unwrap();
    let output = certchain(&home)
        .args(["decode", "-", "--json"])
        .write_stdin(FULL)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).expect("json report");
    assert_eq!(report["message"], "Certificate found successfully!");
    assert_eq!(report["found"], true);
    assert_eq!(report["valid"], true);
    assert_eq!(report["detail"]["course_name"], "B.Tech CS");
    assert_eq!(report["detail"]["expiry"], 1365);
}

#[test]
fn decode_garbage_is_invalid_response() {
    let home = TempDir::new().unwrap();
    certchain(&home)
        .arg("decode")
        .write_stdin("not a response")
        .assert()
        .code(6);
}

#[test]
fn issue_rejects_zero_days_before_wallet() {
    let home = TempDir::new().unwrap();
    certchain(&home)
        .args([
            "issue",
            "--student",
            STUDENT,
            "--course",
            "B.Tech CS",
            "--organization",
            "NIT Rourkela",
            "--validity-days",
            "0",
            "--wallet-url",
            "http://127.0.0.1:9",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Please enter a valid number of days (greater than 0)",
        ));
}

#[test]
fn issue_without_wallet_session_asks_to_connect() {
    let home = TempDir::new().unwrap();
    certchain(&home)
        .args([
            "issue",
            "--student",
            STUDENT,
            "--course",
            "B.Tech CS",
            "--organization",
            "NIT Rourkela",
            "--wallet-url",
            "http://127.0.0.1:9",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please connect your wallet first"));
}

#[test]
fn verify_rejects_bad_ids() {
    let home = TempDir::new().unwrap();
    for id in ["", "abc", "-3", "0"] {
        certchain(&home)
            .args(["verify", id])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Please enter a certificate ID"));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn verify_against_node() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "okay": true, "result": FULL })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        let home = TempDir::new().unwrap();
        certchain(&home)
            .args(["verify", "7", "--node-url", &uri])
            .output()
            .expect("run certchain")
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Certificate Valid"))
        .stdout(predicate::str::contains("NIT Rourkela"));
}

#[tokio::test(flavor = "multi_thread")]
async fn verify_unknown_id_exits_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "okay": true, "result": ERR_U404 })),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        let home = TempDir::new().unwrap();
        certchain(&home)
            .args(["verify", "404", "--node-url", &uri])
            .output()
            .expect("run certchain")
    })
    .await
    .unwrap();

    output
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Certificate not found"));
}

#[test]
fn config_reports_effective_values() {
    let home = TempDir::new().unwrap();
    let output = certchain(&home)
        .args(["config", "--json", "--network", "mainnet"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).expect("json config");
    assert_eq!(report["network"], "mainnet");
    assert_eq!(report["effective_node_url"], "https://api.hiro.so");
    assert_eq!(report["config_file"], Value::Null);
}

#[test]
fn config_file_is_loaded() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("custom.yaml");
    fs::write(&file, "contract_name: cert-dapp-v2\nwallet_timeout_ms: 2500\n").unwrap();

    certchain(&home)
        .arg("config")
        .arg("--config")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("contract_name: cert-dapp-v2"))
        .stdout(predicate::str::contains("wallet_timeout_ms: 2500"));
}

#[test]
fn version_prints_package_version() {
    let home = TempDir::new().unwrap();
    certchain(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
