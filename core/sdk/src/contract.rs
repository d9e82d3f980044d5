//! ABI encoding of calls into FHE-enabled contracts.
//!
//! Encrypted arguments follow the positional convention of the on-chain
//! input verifier: every handle is passed as `bytes`, followed by the batch
//! proof as a last `bytes` argument.
use crate::error::{error_and_log, Result, SdkError};
use crate::types::{handle_to_bytes, BatchedEncryptedInput};
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address, Bytes, Selector};

#[derive(Clone, Debug, PartialEq)]
pub struct ContractCall {
    pub contract_address: Address,
    /// Canonical function signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    pub args: Vec<DynSolValue>,
}

impl ContractCall {
    pub fn new(contract_address: Address, signature: impl Into<String>) -> Self {
        Self {
            contract_address,
            signature: signature.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: DynSolValue) -> Self {
        self.args.push(value);
        self
    }

    /// Append the handles of `input` and its proof.
    pub fn encrypted_args(mut self, input: &BatchedEncryptedInput) -> Result<Self> {
        for handle in &input.handles {
            self.args.push(DynSolValue::Bytes(handle_to_bytes(handle)?));
        }
        self.args
            .push(DynSolValue::Bytes(input.input_proof.clone()));
        Ok(self)
    }

    /// The first 4 bytes of the keccak hash of the signature.
    ///
    /// Fails if the signature is not canonical or does not match the arguments.
    pub fn selector(&self) -> Result<Selector> {
        let params = parse_signature(&self.signature)?;
        // `matches` zips the tuple members, the arity has to be checked on its own
        let arity_matches = match &params {
            DynSolType::Tuple(types) => types.len() == self.args.len(),
            _ => false,
        };
        let args = DynSolValue::Tuple(self.args.clone());
        if !arity_matches || !params.matches(&args) {
            return Err(error_and_log(SdkError::InvalidCall(format!(
                "arguments do not match the parameters of {}",
                self.signature
            ))));
        }
        let hash = keccak256(self.signature.as_bytes());
        Ok(Selector::from_slice(&hash[..4]))
    }

    /// Selector followed by the ABI encoding of the arguments.
    pub fn calldata(&self) -> Result<Bytes> {
        let selector = self.selector()?;
        let encoded = DynSolValue::Tuple(self.args.clone()).abi_encode_params();
        let mut calldata = Vec::with_capacity(selector.len() + encoded.len());
        calldata.extend_from_slice(selector.as_slice());
        calldata.extend_from_slice(&encoded);
        tracing::debug!(
            "Encoded {} bytes of calldata for {} on {}",
            calldata.len(),
            self.signature,
            self.contract_address
        );
        Ok(calldata.into())
    }
}

/// The parameter tuple of a canonical signature `name(type,...)`.
fn parse_signature(signature: &str) -> Result<DynSolType> {
    let invalid = |reason: &str| {
        error_and_log(SdkError::InvalidCall(format!(
            "malformed function signature {signature:?}: {reason}"
        )))
    };

    if signature.chars().any(char::is_whitespace) {
        return Err(invalid("whitespace is not allowed"));
    }
    let open = signature
        .find('(')
        .ok_or_else(|| invalid("missing parameter list"))?;
    if !signature.ends_with(')') {
        return Err(invalid("missing closing parenthesis"));
    }
    let (name, params) = signature.split_at(open);
    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid_name {
        return Err(invalid("invalid function name"));
    }

    if params == "()" {
        return Ok(DynSolType::Tuple(Vec::new()));
    }
    DynSolType::parse(params).map_err(|e| invalid(&e.to_string()))
}
