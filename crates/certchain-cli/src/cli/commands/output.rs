use serde::Serialize;

use certchain_core::VerificationOutcome;

use crate::exit_codes::{EXIT_FAILURE, EXIT_SUCCESS};

#[derive(Serialize)]
struct OutcomeReport<'a> {
    message: &'a str,
    #[serde(flatten)]
    outcome: &'a VerificationOutcome,
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_outcome(outcome: &VerificationOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&OutcomeReport {
            message: outcome.message(),
            outcome,
        });
    }

    println!("{}", outcome.message());
    if let Some(err) = &outcome.decode_error {
        eprintln!("warning: response could not be decoded: {err}");
        return Ok(());
    }
    if !outcome.found {
        return Ok(());
    }

    if outcome.valid {
        println!("Certificate Valid");
    } else {
        println!("Certificate Expired/Invalid");
    }

    if let Some(cert) = &outcome.detail {
        println!("  Student:       {}", cert.student);
        println!("  Course:        {}", cert.course_name);
        println!("  Organization:  {}", cert.organization);
        println!("  Issued:        {}", cert.issued_at_label());
        println!("  Expires:       {}", cert.expiry_label());
        println!("  Issuer:        {}", cert.issuer);
    }
    if let Some(reason) = &outcome.reason {
        println!("  Reason:        {reason}");
    }
    Ok(())
}

/// Success only for a decoded, found and valid certificate.
pub(crate) fn outcome_exit_code(outcome: &VerificationOutcome) -> i32 {
    if outcome.found && outcome.valid && outcome.is_decoded() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}
