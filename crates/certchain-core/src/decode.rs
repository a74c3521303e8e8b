//! `verify-certificate` response decoding.
//!
//! The response is `(response {valid, details, reason} _)` rendered as nested
//! `{type, value}` envelopes:
//!
//! ```text
//! {type: ok, value: {type: tuple, value: {
//!     valid:   {type: true|false},
//!     details: {type: none} | {type: some, value: {type: tuple, value: {
//!         student, course-name, organization, issuer, issued-at, expiry }}},
//!     reason:  {type: none} | {type: some, value: {type: utf8, value: ".."}} }}}
//! ```
//!
//! [`decode`] is total: any shape yields a [`VerificationOutcome`], with
//! malformed input reported through [`VerificationOutcome::decode_error`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{Certificate, RawEnvelope};

/// Where and how an envelope failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeErrorKind {
    #[error("missing key at {path}")]
    MissingKey { path: String },

    #[error("unexpected tag {found:?} at {path}")]
    UnexpectedTag { path: String, found: String },

    #[error("invalid value at {path}: {message}")]
    InvalidLeaf { path: String, message: String },
}

/// Decoded verification result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    /// The contract answered `ok`.
    pub found: bool,
    pub valid: bool,
    /// Present only when `details` was `some`.
    pub detail: Option<Certificate>,
    /// Contract-supplied reason, usually for invalid certificates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when the envelope was malformed; `valid` and `detail` are then
    /// not reliable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<DecodeErrorKind>,
}

impl VerificationOutcome {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_decoded(&self) -> bool {
        self.decode_error.is_none()
    }

    pub fn message(&self) -> &'static str {
        if self.found {
            "Certificate found successfully!"
        } else {
            "Certificate not found"
        }
    }
}

/// Decode a `verify-certificate` envelope.
pub fn decode(envelope: &RawEnvelope) -> VerificationOutcome {
    match tag(envelope, "") {
        Ok("ok") => {}
        Ok("err" | "error") => return VerificationOutcome::not_found(),
        Ok(other) => {
            return malformed(
                false,
                DecodeErrorKind::UnexpectedTag {
                    path: "type".to_string(),
                    found: other.to_string(),
                },
            )
        }
        Err(e) => return malformed(false, e),
    }

    match decode_ok_body(envelope) {
        Ok(outcome) => outcome,
        Err(e) => malformed(true, e),
    }
}

fn malformed(found: bool, error: DecodeErrorKind) -> VerificationOutcome {
    tracing::debug!(error = %error, "malformed verification envelope");
    VerificationOutcome {
        found,
        decode_error: Some(error),
        ..VerificationOutcome::default()
    }
}

fn decode_ok_body(envelope: &Value) -> Result<VerificationOutcome, DecodeErrorKind> {
    let inner = child(envelope, "value", "")?;
    let fields = tuple_fields(inner, "value")?;

    let valid = match tag(field(fields, "valid", "value.value")?, "value.value.valid")? {
        "true" => true,
        "false" => false,
        other => {
            return Err(DecodeErrorKind::UnexpectedTag {
                path: "value.value.valid.type".to_string(),
                found: other.to_string(),
            })
        }
    };

    let details = field(fields, "details", "value.value")?;
    let detail = match tag(details, "value.value.details")? {
        "none" => None,
        "some" => {
            let body = child(details, "value", "value.value.details")?;
            let leaves = tuple_fields(body, "value.value.details.value")?;
            Some(certificate(leaves, "value.value.details.value.value")?)
        }
        other => {
            return Err(DecodeErrorKind::UnexpectedTag {
                path: "value.value.details.type".to_string(),
                found: other.to_string(),
            })
        }
    };

    Ok(VerificationOutcome {
        found: true,
        valid,
        detail,
        reason: fields.get("reason").and_then(optional_text),
        decode_error: None,
    })
}

fn certificate(leaves: &Map<String, Value>, path: &str) -> Result<Certificate, DecodeErrorKind> {
    Ok(Certificate {
        student: text_leaf(leaves, "student", path)?,
        course_name: text_leaf(leaves, "course-name", path)?,
        organization: text_leaf(leaves, "organization", path)?,
        issuer: text_leaf(leaves, "issuer", path)?,
        issued_at: height_leaf(leaves, "issued-at", path)?,
        expiry: height_leaf(leaves, "expiry", path)?,
    })
}

/// `reason` is advisory; anything but `some` with text is treated as absent.
fn optional_text(reason: &Value) -> Option<String> {
    if reason.get("type").and_then(Value::as_str) != Some("some") {
        return None;
    }
    reason
        .get("value")?
        .get("value")?
        .as_str()
        .map(String::from)
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn child<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value, DecodeErrorKind> {
    value
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| DecodeErrorKind::MissingKey {
            path: join(path, key),
        })
}

fn field<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, DecodeErrorKind> {
    fields.get(key).ok_or_else(|| DecodeErrorKind::MissingKey {
        path: join(path, key),
    })
}

fn tag<'a>(value: &'a Value, path: &str) -> Result<&'a str, DecodeErrorKind> {
    child(value, "type", path)?
        .as_str()
        .ok_or_else(|| DecodeErrorKind::InvalidLeaf {
            path: join(path, "type"),
            message: "tag is not a string".to_string(),
        })
}

/// Fields of a tuple envelope at `path`. The `tuple` tag may be omitted.
fn tuple_fields<'a>(
    tuple: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, DecodeErrorKind> {
    if let Some(found) = tuple.get("type") {
        if found.as_str() != Some("tuple") {
            return Err(DecodeErrorKind::UnexpectedTag {
                path: join(path, "type"),
                found: found.as_str().map_or_else(|| found.to_string(), String::from),
            });
        }
    }

    child(tuple, "value", path)?
        .as_object()
        .ok_or_else(|| DecodeErrorKind::InvalidLeaf {
            path: join(path, "value"),
            message: "expected tuple fields".to_string(),
        })
}

/// A `{type, value}` leaf's value.
fn leaf<'a>(
    leaves: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, DecodeErrorKind> {
    let leaf_path = join(path, key);
    let leaf = field(leaves, key, path)?;
    tag(leaf, &leaf_path)?;
    child(leaf, "value", &leaf_path)
}

fn text_leaf(leaves: &Map<String, Value>, key: &str, path: &str) -> Result<String, DecodeErrorKind> {
    leaf(leaves, key, path)?
        .as_str()
        .map(String::from)
        .ok_or_else(|| DecodeErrorKind::InvalidLeaf {
            path: join(path, key),
            message: "expected a string".to_string(),
        })
}

/// Block heights arrive as decimal strings; plain JSON numbers are accepted.
fn height_leaf(leaves: &Map<String, Value>, key: &str, path: &str) -> Result<u128, DecodeErrorKind> {
    let value = leaf(leaves, key, path)?;
    let parsed = match value {
        Value::String(s) => s.parse::<u128>().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    };
    parsed.ok_or_else(|| DecodeErrorKind::InvalidLeaf {
        path: join(path, key),
        message: format!("expected a block height, got {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clarity::ClarityValue;
    use proptest::prelude::*;
    use serde_json::json;

    const FULL: &str = "0x070c000000030764657461696c730a0c000000060b636f757273652d6e616d650e00000009422e54656368204353066578706972790100000000000000000000000000000555096973737565642d617401000000000000000000000000000003e806697373756572051ac91004fbe8c589b5c9bc0bf1bc2a614937d292b90c6f7267616e697a6174696f6e0e0000000c4e495420526f75726b656c610773747564656e74051a6d78de7b0625dfbfc16c3a8a5735f6dc3dc3f2ce06726561736f6e090576616c696403";
    const INVALID: &str = "0x070c000000030764657461696c730906726561736f6e0a0d00000007657870697265640576616c696404";
    const ERR: &str = "0x080100000000000000000000000000000194";

    fn envelope(hex: &str) -> Value {
        ClarityValue::from_hex(hex).unwrap().to_json()
    }

    #[test]
    fn test_full_details() {
        let outcome = decode(&envelope(FULL));
        assert!(outcome.is_decoded());
        assert!(outcome.found);
        assert!(outcome.valid);
        assert_eq!(outcome.reason, None);
        assert_eq!(
            outcome.detail,
            Some(Certificate {
                student: "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".into(),
                course_name: "B.Tech CS".into(),
                organization: "NIT Rourkela".into(),
                issuer: "ST34H017VX32RKDE9QG5Z3F1AC54KFMMJQ7QMS5H4".into(),
                issued_at: 1000,
                expiry: 1365,
            })
        );
        assert_eq!(outcome.message(), "Certificate found successfully!");
    }

    #[test]
    fn test_invalid_with_reason() {
        let outcome = decode(&envelope(INVALID));
        assert!(outcome.is_decoded());
        assert!(!outcome.valid);
        assert_eq!(outcome.detail, None);
        assert_eq!(outcome.reason.as_deref(), Some("expired"));
    }

    #[test]
    fn test_err_response_is_not_found() {
        let outcome = decode(&envelope(ERR));
        assert_eq!(outcome, VerificationOutcome::not_found());
        assert_eq!(outcome.message(), "Certificate not found");
    }

    #[test]
    fn test_error_tag_is_not_found() {
        let outcome = decode(&json!({ "type": "error", "value": "anything" }));
        assert!(!outcome.found);
        assert!(!outcome.valid);
        assert!(outcome.detail.is_none());
        assert!(outcome.is_decoded());
    }

    #[test]
    fn test_untagged_inner_tuple() {
        let outcome = decode(&json!({
            "type": "ok",
            "value": { "value": { "valid": { "type": "false" }, "details": { "type": "none" } } }
        }));
        assert_eq!(
            outcome,
            VerificationOutcome {
                found: true,
                valid: false,
                detail: None,
                reason: None,
                decode_error: None,
            }
        );
    }

    #[test]
    fn test_missing_details_is_decode_error() {
        let outcome = decode(&json!({
            "type": "ok",
            "value": { "type": "tuple", "value": { "valid": { "type": "true" } } }
        }));
        assert_eq!(
            outcome.decode_error,
            Some(DecodeErrorKind::MissingKey {
                path: "value.value.details".into()
            })
        );
        assert!(!outcome.valid);
    }

    #[test]
    fn test_bad_leaf_reports_path() {
        let mut env = envelope(FULL);
        env["value"]["value"]["details"]["value"]["value"]["expiry"]["value"] = json!("soon");
        let outcome = decode(&env);
        assert!(matches!(
            outcome.decode_error,
            Some(DecodeErrorKind::InvalidLeaf { ref path, .. })
                if path == "value.value.details.value.value.expiry"
        ));
        assert!(outcome.detail.is_none());

        let mut env = envelope(FULL);
        env["value"]["value"]["details"]["value"]["value"]
            .as_object_mut()
            .unwrap()
            .remove("issuer");
        assert_eq!(
            decode(&env).decode_error,
            Some(DecodeErrorKind::MissingKey {
                path: "value.value.details.value.value.issuer".into()
            })
        );
    }

    #[test]
    fn test_numeric_heights_accepted() {
        let mut env = envelope(FULL);
        env["value"]["value"]["details"]["value"]["value"]["issued-at"]["value"] = json!(1000);
        let outcome = decode(&env);
        assert_eq!(outcome.detail.map(|d| d.issued_at), Some(1000));
    }

    #[test]
    fn test_heights_beyond_u64() {
        let height = u128::from(u64::MAX) + 1;
        let mut env = envelope(FULL);
        env["value"]["value"]["details"]["value"]["value"]["expiry"] =
            ClarityValue::uint(height).to_json();

        let outcome = decode(&env);
        assert!(outcome.is_decoded());
        assert!(outcome.valid);
        let cert = outcome.detail.expect("details");
        assert_eq!(cert.expiry, height);
        assert_eq!(cert.expiry_label(), "Block #18446744073709551616");
    }

    #[test]
    fn test_unexpected_tags() {
        assert!(matches!(
            decode(&json!({ "type": "some", "value": {} })).decode_error,
            Some(DecodeErrorKind::UnexpectedTag { .. })
        ));
        assert!(matches!(
            decode(&json!({ "value": 1 })).decode_error,
            Some(DecodeErrorKind::MissingKey { ref path }) if path == "type"
        ));
        assert!(matches!(
            decode(&json!({
                "type": "ok",
                "value": { "type": "list", "value": [] }
            }))
            .decode_error,
            Some(DecodeErrorKind::UnexpectedTag { .. })
        ));
        assert!(decode(&json!(null)).decode_error.is_some());
        assert!(decode(&json!("ok")).decode_error.is_some());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            prop_oneof![
                Just("ok"),
                Just("err"),
                Just("some"),
                Just("none"),
                Just("true"),
                Just("tuple"),
                Just("type"),
                Just("value"),
                Just("details"),
                Just("valid"),
            ]
            .prop_map(Value::from),
        ];
        leaf.prop_recursive(6, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                prop::collection::btree_map(
                    prop_oneof![
                        Just("type".to_string()),
                        Just("value".to_string()),
                        Just("valid".to_string()),
                        Just("details".to_string()),
                        Just("reason".to_string()),
                    ],
                    inner,
                    0..4
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_decode_is_total(value in arb_json()) {
            let outcome = decode(&value);
            if outcome.decode_error.is_some() {
                prop_assert!(!outcome.valid);
                prop_assert!(outcome.detail.is_none());
            }
        }
    }
}
