//! Decode a saved `verify-certificate` response offline.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use certchain_core::{decode, ClarityValue, RawEnvelope};

use super::super::args::{DecodeArgs, GlobalArgs};
use super::output::{outcome_exit_code, print_outcome};
use crate::exit_codes::EXIT_INVALID_RESPONSE;

pub fn run(args: DecodeArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let text = read_input(args.input.as_deref())?;

    let envelope = match parse_envelope(&text) {
        Ok(envelope) => envelope,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(EXIT_INVALID_RESPONSE);
        }
    };

    let outcome = decode(&envelope);
    print_outcome(&outcome, global.json)?;
    Ok(outcome_exit_code(&outcome))
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// A JSON envelope, or the node's raw `0x` result hex.
fn parse_envelope(text: &str) -> anyhow::Result<RawEnvelope> {
    let trimmed = text.trim();
    if trimmed.starts_with("0x") {
        let value = ClarityValue::from_hex(trimmed).context("invalid result hex")?;
        return Ok(value.to_json());
    }
    serde_json::from_str(trimmed).context("input is neither a JSON envelope nor 0x hex")
}
