use crate::consts::PROOF_LEN;
use crate::cryptography::cipher::CipherBackend;
use crate::error::{error_and_log, Result, SdkError};
use crate::key::KeyMaterial;
use crate::types::{BatchedEncryptedInput, ClearInput, FheValueKind};
use crate::validation::validate;

/// Accumulates the encrypted arguments of a single contract call.
///
/// Values are only validated when [`Self::encrypt`] is called. Finalizing
/// consumes the builder, so it cannot be encrypted twice.
pub struct EncryptedInputBuilder<'a> {
    key: &'a KeyMaterial,
    backend: &'a dyn CipherBackend,
    inputs: Vec<(ClearInput, FheValueKind)>,
}

impl<'a> EncryptedInputBuilder<'a> {
    pub fn new(key: &'a KeyMaterial, backend: &'a dyn CipherBackend) -> Self {
        Self {
            key,
            backend,
            inputs: Vec::new(),
        }
    }

    pub fn add(mut self, value: impl Into<ClearInput>, kind: FheValueKind) -> Self {
        self.inputs.push((value.into(), kind));
        self
    }

    pub fn add_bool(self, value: impl Into<ClearInput>) -> Self {
        self.add(value, FheValueKind::Bool)
    }

    pub fn add8(self, value: impl Into<ClearInput>) -> Self {
        self.add(value, FheValueKind::Uint8)
    }

    pub fn add16(self, value: impl Into<ClearInput>) -> Self {
        self.add(value, FheValueKind::Uint16)
    }

    pub fn add32(self, value: impl Into<ClearInput>) -> Self {
        self.add(value, FheValueKind::Uint32)
    }

    pub fn add64(self, value: impl Into<ClearInput>) -> Self {
        self.add(value, FheValueKind::Uint64)
    }

    pub fn add_address(self, value: impl Into<ClearInput>) -> Self {
        self.add(value, FheValueKind::Address)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Validate and encrypt every accumulated value, in insertion order.
    ///
    /// The first invalid value aborts the whole batch.
    pub fn encrypt(self) -> Result<BatchedEncryptedInput> {
        if self.inputs.is_empty() {
            return Err(error_and_log(SdkError::NoInputs));
        }

        let mut handles = Vec::with_capacity(self.inputs.len());
        let mut input_proof = Vec::with_capacity(self.inputs.len() * PROOF_LEN);
        let mut kinds = Vec::with_capacity(self.inputs.len());
        for (idx, (input, kind)) in self.inputs.iter().enumerate() {
            let value = validate(input, *kind)?;
            let payload = self.backend.encrypt(&value, self.key)?;
            tracing::debug!(
                "Encrypted input #{idx} ({kind}) with the {} backend",
                self.backend.name()
            );
            handles.push(payload.handle());
            input_proof.extend_from_slice(&payload.proof);
            kinds.push(payload.kind);
        }

        Ok(BatchedEncryptedInput {
            handles,
            input_proof,
            kinds,
        })
    }
}
