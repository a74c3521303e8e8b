//! Typed ledger values.
//!
//! [`ClarityValue`] is the value language spoken by the certificate contract.
//! Arguments are built here and serialized with [`wire`]; read-only results
//! come back in the same binary form and are turned into the SDK-style
//! `{type, value}` JSON envelope with [`ClarityValue::to_json`].

pub mod c32;
pub mod wire;

use std::collections::BTreeMap;

use serde_json::{json, Value};

pub use c32::{ContractPrincipal, Principal, PrincipalError, StandardPrincipal};
pub use wire::{WireError, MAX_NESTING_DEPTH};

/// A ledger value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Buffer(Vec<u8>),
    Bool(bool),
    Principal(Principal),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    Tuple(BTreeMap<String, ClarityValue>),
    StringAscii(String),
    StringUtf8(String),
}

impl ClarityValue {
    /// Standard principal from its c32check address.
    pub fn standard_principal(address: &str) -> Result<Self, PrincipalError> {
        let principal: StandardPrincipal = address.parse()?;
        Ok(Self::Principal(Principal::Standard(principal)))
    }

    pub fn uint(value: impl Into<u128>) -> Self {
        Self::UInt(value.into())
    }

    pub fn string_utf8(value: impl Into<String>) -> Self {
        Self::StringUtf8(value.into())
    }

    pub fn some(value: ClarityValue) -> Self {
        Self::OptionalSome(Box::new(value))
    }

    pub fn ok(value: ClarityValue) -> Self {
        Self::ResponseOk(Box::new(value))
    }

    pub fn err(value: ClarityValue) -> Self {
        Self::ResponseErr(Box::new(value))
    }

    pub fn tuple<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ClarityValue)>,
    {
        Self::Tuple(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Envelope tag used by the SDK JSON representation.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Buffer(_) => "buffer",
            Self::Bool(true) => "true",
            Self::Bool(false) => "false",
            Self::Principal(Principal::Standard(_)) => "address",
            Self::Principal(Principal::Contract(_)) => "contract",
            Self::ResponseOk(_) => "ok",
            Self::ResponseErr(_) => "err",
            Self::OptionalNone => "none",
            Self::OptionalSome(_) => "some",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::StringAscii(_) => "ascii",
            Self::StringUtf8(_) => "utf8",
        }
    }

    /// Render as the `{type, value}` envelope.
    ///
    /// Integers become decimal strings (they exceed JSON's safe range),
    /// buffers lowercase hex, and `true`/`false`/`none` carry no `value`.
    pub fn to_json(&self) -> Value {
        let tag = self.type_tag();
        match self {
            Self::Int(n) => json!({ "type": tag, "value": n.to_string() }),
            Self::UInt(n) => json!({ "type": tag, "value": n.to_string() }),
            Self::Buffer(bytes) => json!({ "type": tag, "value": hex::encode(bytes) }),
            Self::Bool(_) | Self::OptionalNone => json!({ "type": tag }),
            Self::Principal(p) => json!({ "type": tag, "value": p.to_string() }),
            Self::ResponseOk(inner) | Self::ResponseErr(inner) | Self::OptionalSome(inner) => {
                json!({ "type": tag, "value": inner.to_json() })
            }
            Self::List(items) => json!({
                "type": tag,
                "value": items.iter().map(Self::to_json).collect::<Vec<_>>(),
            }),
            Self::Tuple(entries) => {
                let fields: serde_json::Map<String, Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                json!({ "type": tag, "value": fields })
            }
            Self::StringAscii(s) | Self::StringUtf8(s) => json!({ "type": tag, "value": s }),
        }
    }

    /// `0x`-prefixed hex of the consensus serialization.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(wire::serialize(self)))
    }

    pub fn from_hex(input: &str) -> Result<Self, WireError> {
        wire::deserialize_hex(input)
    }
}
