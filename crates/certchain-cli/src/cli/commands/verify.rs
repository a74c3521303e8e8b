use certchain_core::{CertificateVerifier, LedgerClient, VerificationResult};
use serde_json::json;

use super::super::args::{GlobalArgs, VerifyArgs};
use super::load_config;
use super::output::{outcome_exit_code, print_json, print_outcome};
use crate::exit_codes::{EXIT_CONFIG_ERROR, EXIT_FAILURE};

pub async fn run(args: VerifyArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = load_config(global)?;
    let verifier = CertificateVerifier::new(LedgerClient::new(config)?);

    let result = verifier.verify(&args.id).await;
    match &result {
        VerificationResult::Completed(outcome) => {
            print_outcome(outcome, global.json)?;
            Ok(outcome_exit_code(outcome))
        }
        VerificationResult::QueryFailed(e) => {
            report_error(&result, Some(e.to_string()), global.json)?;
            Ok(e.exit_code())
        }
        VerificationResult::InputRejected => {
            report_error(&result, None, global.json)?;
            Ok(EXIT_CONFIG_ERROR)
        }
        VerificationResult::Busy => {
            report_error(&result, None, global.json)?;
            Ok(EXIT_FAILURE)
        }
    }
}

fn report_error(
    result: &VerificationResult,
    detail: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(&json!({
            "message": result.message(),
            "error": detail,
        }));
    }
    match detail {
        Some(detail) => eprintln!("error: {} ({detail})", result.message()),
        None => eprintln!("error: {}", result.message()),
    }
    Ok(())
}
