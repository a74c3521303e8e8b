//! Consensus binary encoding of [`ClarityValue`].
//!
//! Every value starts with a one-byte type prefix. Integers are 16-byte
//! big-endian, variable-length payloads carry a u32 big-endian length, and
//! tuple entries are `u8 name length ‖ name ‖ value` in name order.

use std::collections::BTreeMap;

use super::c32::{ContractPrincipal, Principal, StandardPrincipal};
use super::ClarityValue;

/// Maximum nesting depth accepted when decoding.
pub const MAX_NESTING_DEPTH: usize = 64;

const TYPE_INT: u8 = 0x00;
const TYPE_UINT: u8 = 0x01;
const TYPE_BUFFER: u8 = 0x02;
const TYPE_TRUE: u8 = 0x03;
const TYPE_FALSE: u8 = 0x04;
const TYPE_PRINCIPAL_STANDARD: u8 = 0x05;
const TYPE_PRINCIPAL_CONTRACT: u8 = 0x06;
const TYPE_RESPONSE_OK: u8 = 0x07;
const TYPE_RESPONSE_ERR: u8 = 0x08;
const TYPE_OPTIONAL_NONE: u8 = 0x09;
const TYPE_OPTIONAL_SOME: u8 = 0x0a;
const TYPE_LIST: u8 = 0x0b;
const TYPE_TUPLE: u8 = 0x0c;
const TYPE_STRING_ASCII: u8 = 0x0d;
const TYPE_STRING_UTF8: u8 = 0x0e;

/// Errors decoding a serialized value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("unexpected end of input at offset {offset}")]
    Truncated { offset: usize },

    #[error("unknown type prefix 0x{prefix:02x} at offset {offset}")]
    UnknownType { prefix: u8, offset: usize },

    #[error("invalid {kind} string at offset {offset}")]
    InvalidString { kind: &'static str, offset: usize },

    #[error("invalid name at offset {offset}")]
    InvalidName { offset: usize },

    #[error("invalid principal at offset {offset}: {message}")]
    InvalidPrincipal { offset: usize, message: String },

    #[error("nesting deeper than {MAX_NESTING_DEPTH}")]
    DepthExceeded,

    #[error("{count} trailing bytes after value")]
    TrailingBytes { count: usize },
}

/// Serialize a value.
pub fn serialize(value: &ClarityValue) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(&mut out, value);
    out
}

/// Deserialize exactly one value from `bytes`.
pub fn deserialize(bytes: &[u8]) -> Result<ClarityValue, WireError> {
    let mut reader = Reader { bytes, pos: 0 };
    let value = reader.read_value(0)?;
    let remaining = bytes.len() - reader.pos;
    if remaining > 0 {
        return Err(WireError::TrailingBytes { count: remaining });
    }
    Ok(value)
}

/// Deserialize from hex, with or without a `0x` prefix.
pub fn deserialize_hex(input: &str) -> Result<ClarityValue, WireError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| WireError::InvalidHex(e.to_string()))?;
    deserialize(&bytes)
}

fn write_value(out: &mut Vec<u8>, value: &ClarityValue) {
    match value {
        ClarityValue::Int(n) => {
            out.push(TYPE_INT);
            out.extend_from_slice(&n.to_be_bytes());
        }
        ClarityValue::UInt(n) => {
            out.push(TYPE_UINT);
            out.extend_from_slice(&n.to_be_bytes());
        }
        ClarityValue::Buffer(bytes) => {
            out.push(TYPE_BUFFER);
            write_len_prefixed(out, bytes);
        }
        ClarityValue::Bool(true) => out.push(TYPE_TRUE),
        ClarityValue::Bool(false) => out.push(TYPE_FALSE),
        ClarityValue::Principal(Principal::Standard(p)) => {
            out.push(TYPE_PRINCIPAL_STANDARD);
            write_standard(out, p);
        }
        ClarityValue::Principal(Principal::Contract(p)) => {
            out.push(TYPE_PRINCIPAL_CONTRACT);
            write_standard(out, p.issuer());
            write_name(out, p.name());
        }
        ClarityValue::ResponseOk(inner) => {
            out.push(TYPE_RESPONSE_OK);
            write_value(out, inner);
        }
        ClarityValue::ResponseErr(inner) => {
            out.push(TYPE_RESPONSE_ERR);
            write_value(out, inner);
        }
        ClarityValue::OptionalNone => out.push(TYPE_OPTIONAL_NONE),
        ClarityValue::OptionalSome(inner) => {
            out.push(TYPE_OPTIONAL_SOME);
            write_value(out, inner);
        }
        ClarityValue::List(items) => {
            out.push(TYPE_LIST);
            out.extend_from_slice(&(items.len() as u32).to_be_bytes());
            for item in items {
                write_value(out, item);
            }
        }
        ClarityValue::Tuple(entries) => {
            out.push(TYPE_TUPLE);
            out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
            for (name, item) in entries {
                write_name(out, name);
                write_value(out, item);
            }
        }
        ClarityValue::StringAscii(s) => {
            out.push(TYPE_STRING_ASCII);
            write_len_prefixed(out, s.as_bytes());
        }
        ClarityValue::StringUtf8(s) => {
            out.push(TYPE_STRING_UTF8);
            write_len_prefixed(out, s.as_bytes());
        }
    }
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn write_standard(out: &mut Vec<u8>, principal: &StandardPrincipal) {
    out.push(principal.version());
    out.extend_from_slice(principal.hash160());
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(WireError::Truncated { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, WireError> {
        let mut buf = [0_u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    fn read_16(&mut self) -> Result<[u8; 16], WireError> {
        let mut buf = [0_u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn read_len_prefixed(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    fn read_name(&mut self) -> Result<String, WireError> {
        let offset = self.pos;
        let len = usize::from(self.read_u8()?);
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .ok()
            .filter(|s| !s.is_empty() && s.is_ascii())
            .map(String::from)
            .ok_or(WireError::InvalidName { offset })
    }

    fn read_standard(&mut self) -> Result<StandardPrincipal, WireError> {
        let offset = self.pos;
        let version = self.read_u8()?;
        let mut hash160 = [0_u8; 20];
        hash160.copy_from_slice(self.take(20)?);
        StandardPrincipal::new(version, hash160).map_err(|e| WireError::InvalidPrincipal {
            offset,
            message: e.to_string(),
        })
    }

    fn read_value(&mut self, depth: usize) -> Result<ClarityValue, WireError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(WireError::DepthExceeded);
        }

        let offset = self.pos;
        let prefix = self.read_u8()?;
        let value = match prefix {
            TYPE_INT => ClarityValue::Int(i128::from_be_bytes(self.read_16()?)),
            TYPE_UINT => ClarityValue::UInt(u128::from_be_bytes(self.read_16()?)),
            TYPE_BUFFER => ClarityValue::Buffer(self.read_len_prefixed()?.to_vec()),
            TYPE_TRUE => ClarityValue::Bool(true),
            TYPE_FALSE => ClarityValue::Bool(false),
            TYPE_PRINCIPAL_STANDARD => {
                ClarityValue::Principal(Principal::Standard(self.read_standard()?))
            }
            TYPE_PRINCIPAL_CONTRACT => {
                let issuer = self.read_standard()?;
                let name = self.read_name()?;
                let contract = ContractPrincipal::new(issuer, name).map_err(|e| {
                    WireError::InvalidPrincipal {
                        offset,
                        message: e.to_string(),
                    }
                })?;
                ClarityValue::Principal(Principal::Contract(contract))
            }
            TYPE_RESPONSE_OK => ClarityValue::ok(self.read_value(depth + 1)?),
            TYPE_RESPONSE_ERR => ClarityValue::err(self.read_value(depth + 1)?),
            TYPE_OPTIONAL_NONE => ClarityValue::OptionalNone,
            TYPE_OPTIONAL_SOME => ClarityValue::some(self.read_value(depth + 1)?),
            TYPE_LIST => {
                let len = self.read_u32()? as usize;
                // every element takes at least one byte
                let mut items = Vec::with_capacity(len.min(self.bytes.len() - self.pos));
                for _ in 0..len {
                    items.push(self.read_value(depth + 1)?);
                }
                ClarityValue::List(items)
            }
            TYPE_TUPLE => {
                let len = self.read_u32()? as usize;
                let mut entries = BTreeMap::new();
                for _ in 0..len {
                    let name = self.read_name()?;
                    let item = self.read_value(depth + 1)?;
                    entries.insert(name, item);
                }
                ClarityValue::Tuple(entries)
            }
            TYPE_STRING_ASCII => {
                let raw = self.read_len_prefixed()?;
                if !raw.is_ascii() {
                    return Err(WireError::InvalidString {
                        kind: "ascii",
                        offset,
                    });
                }
                ClarityValue::StringAscii(String::from_utf8_lossy(raw).into_owned())
            }
            TYPE_STRING_UTF8 => {
                let raw = self.read_len_prefixed()?;
                let s = std::str::from_utf8(raw).map_err(|_| WireError::InvalidString {
                    kind: "utf8",
                    offset,
                })?;
                ClarityValue::StringUtf8(s.to_string())
            }
            other => {
                return Err(WireError::UnknownType {
                    prefix: other,
                    offset,
                })
            }
        };

        Ok(value)
    }
}
