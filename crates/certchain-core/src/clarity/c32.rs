//! c32check principal codec.
//!
//! A standard principal is rendered as `S` + c32(version) + c32(hash160 ‖ checksum),
//! where the checksum is the first four bytes of a double SHA-256 over
//! `version ‖ hash160`. Contract principals append `.<contract-name>`.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Maximum contract name length in bytes.
pub const MAX_CONTRACT_NAME_LEN: usize = 128;

/// Principal parsing errors.
///
/// Messages keep the `principal` / `checksum mismatch` phrasing so that
/// failure classification can pick the right wording.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    #[error("invalid principal: invalid length")]
    InvalidLength,

    #[error("invalid principal: must start with \"S\"")]
    MissingPrefix,

    #[error("invalid principal: not a c32-encoded string")]
    InvalidCharacter,

    #[error("invalid principal: checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid principal: expected a 20-byte hash, got {0} bytes")]
    InvalidHashLength(usize),

    #[error("invalid principal: version {0} is out of range")]
    InvalidVersion(u8),

    #[error("invalid principal: bad contract name {0:?}")]
    InvalidContractName(String),
}

/// A standard (account) principal: address version plus hash160.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardPrincipal {
    version: u8,
    hash160: [u8; 20],
}

impl StandardPrincipal {
    pub fn new(version: u8, hash160: [u8; 20]) -> Result<Self, PrincipalError> {
        if usize::from(version) >= C32_ALPHABET.len() {
            return Err(PrincipalError::InvalidVersion(version));
        }
        Ok(Self { version, hash160 })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash160(&self) -> &[u8; 20] {
        &self.hash160
    }
}

impl FromStr for StandardPrincipal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() <= 5 {
            return Err(PrincipalError::InvalidLength);
        }

        let normalized = normalize(s);
        let body = normalized
            .strip_prefix('S')
            .ok_or(PrincipalError::MissingPrefix)?;

        let mut chars = body.chars();
        let version = chars
            .next()
            .and_then(c32_index)
            .ok_or(PrincipalError::InvalidCharacter)?;

        let data = c32_decode(chars.as_str())?;
        if data.len() < 4 {
            return Err(PrincipalError::InvalidLength);
        }

        let (hash, check) = data.split_at(data.len() - 4);
        if checksum(version, hash) != check {
            return Err(PrincipalError::ChecksumMismatch);
        }

        let hash160: [u8; 20] = hash
            .try_into()
            .map_err(|_| PrincipalError::InvalidHashLength(hash.len()))?;

        Ok(Self { version, hash160 })
    }
}

impl fmt::Display for StandardPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = Vec::with_capacity(24);
        payload.extend_from_slice(&self.hash160);
        payload.extend_from_slice(&checksum(self.version, &self.hash160));

        write!(
            f,
            "S{}{}",
            C32_ALPHABET[usize::from(self.version)] as char,
            c32_encode(&payload)
        )
    }
}

/// A contract principal: deployer plus contract name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractPrincipal {
    issuer: StandardPrincipal,
    name: String,
}

impl ContractPrincipal {
    pub fn new(issuer: StandardPrincipal, name: impl Into<String>) -> Result<Self, PrincipalError> {
        let name = name.into();
        if !is_valid_contract_name(&name) {
            return Err(PrincipalError::InvalidContractName(name));
        }
        Ok(Self { issuer, name })
    }

    pub fn issuer(&self) -> &StandardPrincipal {
        &self.issuer
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ContractPrincipal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, name) = s
            .split_once('.')
            .ok_or_else(|| PrincipalError::InvalidContractName(String::new()))?;
        Self::new(address.parse()?, name)
    }
}

impl fmt::Display for ContractPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.issuer, self.name)
    }
}

/// Any principal the ledger accepts as an address-typed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    Standard(StandardPrincipal),
    Contract(ContractPrincipal),
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('.') {
            s.parse().map(Self::Contract)
        } else {
            s.parse().map(Self::Standard)
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(p) => p.fmt(f),
            Self::Contract(p) => p.fmt(f),
        }
    }
}

/// Contract names: ASCII letter first, then letters, digits, `-` or `_`.
pub(crate) fn is_valid_contract_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name.len() <= MAX_CONTRACT_NAME_LEN
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn normalize(s: &str) -> String {
    s.to_ascii_uppercase()
        .chars()
        .map(|c| match c {
            'O' => '0',
            'L' | 'I' => '1',
            other => other,
        })
        .collect()
}

fn c32_index(c: char) -> Option<u8> {
    C32_ALPHABET
        .iter()
        .position(|&a| char::from(a) == c)
        .map(|i| i as u8)
}

fn checksum(version: u8, hash: &[u8]) -> [u8; 4] {
    let mut hasher = Sha256::new();
    hasher.update([version]);
    hasher.update(hash);
    let first = hasher.finalize();
    let second = Sha256::digest(&first[..]);

    let mut out = [0_u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

/// Big-number base conversion, one leading `0` per leading zero byte.
fn c32_encode(bytes: &[u8]) -> String {
    let leading_zeros = bytes.iter().take_while(|b| **b == 0).count();

    // little-endian base-32 digits
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 8 / 5 + 1);
    for &byte in bytes {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 32) as u8;
            carry /= 32;
        }
        while carry > 0 {
            digits.push((carry % 32) as u8);
            carry /= 32;
        }
    }

    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat('0').take(leading_zeros));
    out.extend(
        digits
            .iter()
            .rev()
            .map(|&d| char::from(C32_ALPHABET[usize::from(d)])),
    );
    out
}

fn c32_decode(input: &str) -> Result<Vec<u8>, PrincipalError> {
    let leading_zeros = input.bytes().take_while(|b| *b == b'0').count();

    // little-endian base-256 bytes
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len() * 5 / 8 + 1);
    for c in input.chars() {
        let mut carry = u32::from(c32_index(c).ok_or(PrincipalError::InvalidCharacter)?);
        for byte in bytes.iter_mut() {
            carry += u32::from(*byte) * 32;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0_u8; leading_zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}
