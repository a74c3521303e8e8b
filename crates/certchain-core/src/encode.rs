//! Contract call construction for `issue-certificate`.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::clarity::{ClarityValue, PrincipalError};
use crate::types::{AppDetails, ContractId, Network, ISSUE_FUNCTION};
use crate::validate::CertificateRequest;

/// Encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// Student address is not a standard principal.
    #[error(transparent)]
    Principal(#[from] PrincipalError),
}

pub type EncodeResult<T> = Result<T, EncodeError>;

/// The four `issue-certificate` arguments, in contract order:
/// principal, utf8, utf8, uint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueArguments([ClarityValue; 4]);

impl IssueArguments {
    pub fn as_slice(&self) -> &[ClarityValue] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<ClarityValue> {
        self.0.into()
    }

    /// `0x`-prefixed serialized arguments, as wallets and nodes take them.
    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(ClarityValue::to_hex).collect()
    }
}

/// Map a validated request to contract arguments.
pub fn encode(request: &CertificateRequest) -> EncodeResult<IssueArguments> {
    let student = ClarityValue::standard_principal(request.student_address())?;

    let args = IssueArguments([
        student,
        ClarityValue::string_utf8(request.course_name()),
        ClarityValue::string_utf8(request.organization()),
        ClarityValue::uint(request.validity_days()),
    ]);

    debug!(
        student = request.student_address(),
        validity_days = request.validity_days(),
        "encoded issue-certificate arguments"
    );
    Ok(args)
}

/// Everything a wallet needs to prompt for and broadcast a contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCallDescriptor {
    pub contract_address: String,
    pub contract_name: String,
    pub function_name: String,
    #[serde(serialize_with = "serialize_args")]
    pub function_args: Vec<ClarityValue>,
    pub network: Network,
    pub app_details: AppDetails,
}

impl ContractCallDescriptor {
    pub fn issue_certificate(
        contract: &ContractId,
        args: IssueArguments,
        network: Network,
        app_details: AppDetails,
    ) -> Self {
        Self {
            contract_address: contract.address.clone(),
            contract_name: contract.name.clone(),
            function_name: ISSUE_FUNCTION.to_string(),
            function_args: args.into_vec(),
            network,
            app_details,
        }
    }

    pub fn contract(&self) -> ContractId {
        ContractId::new(&self.contract_address, &self.contract_name)
    }
}

fn serialize_args<S: Serializer>(args: &[ClarityValue], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(args.len()))?;
    for arg in args {
        seq.serialize_element(&arg.to_hex())?;
    }
    seq.end()
}
