use crate::codec::encode;
use crate::conf::{NetworkConfig, SdkConfig};
use crate::cryptography::authorization::{
    sign_authorization, verify_authorization, DecryptionAuthorization, DecryptionRequest,
};
use crate::cryptography::cipher::{CipherBackend, MockCipher};
use crate::decryption::{batch_decrypt, decrypt_handle};
use crate::error::{error_and_log, Result, SdkError};
use crate::input::EncryptedInputBuilder;
use crate::key::{fetch_public_key, refresh_public_key, KeyMaterial};
use crate::types::{BatchedEncryptedInput, ClearInput, EncryptedPayload, FheValueKind, TypedValue};
use crate::util::rate_limiter::RateLimiter;
use crate::validation::validate;
use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use observability::metrics_names::{
    OP_BATCH_DECRYPT, OP_DECRYPT, OP_ENCRYPT, OP_ENCRYPT_INPUT, OP_SIGN_AUTHORIZATION,
    OP_USER_DECRYPT, OP_VERIFY_AUTHORIZATION,
};
use std::sync::Arc;

/// Entry point of the SDK, bound to one network and its public key.
///
/// The key is fetched once at construction. All operations take `&self`, and
/// the only shared state is the rate limiter, so an instance can be shared
/// between threads.
pub struct FhevmSdk {
    config: SdkConfig,
    key: KeyMaterial,
    backend: Arc<dyn CipherBackend>,
    rate_limiter: Option<RateLimiter>,
}

impl FhevmSdk {
    /// Create an SDK instance using the placeholder cipher.
    pub fn new(config: SdkConfig) -> Result<Self> {
        Self::with_backend(config, Arc::new(MockCipher))
    }

    pub fn with_backend(config: SdkConfig, backend: Arc<dyn CipherBackend>) -> Result<Self> {
        config.check()?;
        let key = fetch_public_key(&config.network)?;
        let rate_limiter = config.rate_limiter.clone().map(RateLimiter::new);
        tracing::info!(
            "Initialized SDK for network {} (chain {}) with the {} backend, rate limiting {}",
            config.network.name,
            config.network.chain_id,
            backend.name(),
            if rate_limiter.is_some() { "on" } else { "off" }
        );
        Ok(Self {
            config,
            key,
            backend,
            rate_limiter,
        })
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.config.network
    }

    pub fn chain_id(&self) -> u64 {
        self.config.network.chain_id
    }

    pub fn key_material(&self) -> &KeyMaterial {
        &self.key
    }

    /// Validate and encrypt a single value.
    pub fn encrypt(&self, input: impl Into<ClearInput>, kind: FheValueKind) -> Result<EncryptedPayload> {
        let _span = tracing::info_span!(OP_ENCRYPT, %kind).entered();
        let value = validate(&input.into(), kind)?;
        tracing::debug!("Encrypting {} bytes", encode(&value).len());
        self.backend.encrypt(&value, &self.key)
    }

    /// Start accumulating the encrypted arguments of a contract call.
    pub fn input_builder(&self) -> EncryptedInputBuilder<'_> {
        EncryptedInputBuilder::new(&self.key, self.backend.as_ref())
    }

    /// Encrypt every value of `inputs` as a single batch.
    pub fn encrypt_inputs(
        &self,
        inputs: impl IntoIterator<Item = (ClearInput, FheValueKind)>,
    ) -> Result<BatchedEncryptedInput> {
        let _span = tracing::info_span!(OP_ENCRYPT_INPUT).entered();
        inputs
            .into_iter()
            .fold(self.input_builder(), |builder, (input, kind)| builder.add(input, kind))
            .encrypt()
    }

    pub fn decrypt(&self, handle: &str, kind: FheValueKind) -> Result<TypedValue> {
        let _span = tracing::info_span!(OP_DECRYPT, %kind).entered();
        decrypt_handle(handle, kind, &self.key, self.backend.as_ref())
    }

    pub fn batch_decrypt<S: AsRef<str>>(
        &self,
        handles: &[S],
        kinds: &[FheValueKind],
    ) -> Result<Vec<TypedValue>> {
        let _span = tracing::info_span!(OP_BATCH_DECRYPT, count = handles.len()).entered();
        batch_decrypt(handles, kinds, &self.key, self.backend.as_ref())
    }

    /// Sign a request to decrypt `handle`, held by `contract_address`, for the signer.
    pub fn sign_authorization(
        &self,
        handle: impl Into<String>,
        contract_address: Address,
        signer: &PrivateKeySigner,
    ) -> Result<DecryptionAuthorization> {
        let _span = tracing::info_span!(OP_SIGN_AUTHORIZATION).entered();
        let request = DecryptionRequest::new(handle, contract_address, signer.address());
        sign_authorization(request, signer, self.chain_id())
    }

    pub fn verify_authorization(
        &self,
        authorization: &DecryptionAuthorization,
        expected_signer: &Address,
    ) -> bool {
        let _span = tracing::info_span!(OP_VERIFY_AUTHORIZATION).entered();
        verify_authorization(authorization, self.chain_id(), expected_signer)
    }

    /// Decrypt the handle of `authorization` on behalf of the user who signed it.
    ///
    /// Only requests carrying a valid signature count against the quota of
    /// their user.
    pub fn user_decrypt(
        &self,
        authorization: &DecryptionAuthorization,
        kind: FheValueKind,
    ) -> Result<TypedValue> {
        let request = &authorization.request;
        let _span = tracing::info_span!(OP_USER_DECRYPT, user = %request.user_address).entered();
        if !authorization.is_valid(self.chain_id()) {
            return Err(error_and_log(SdkError::Unauthorized {
                handle: request.handle.clone(),
                user: request.user_address.to_string(),
            }));
        }
        if let Some(rate_limiter) = &self.rate_limiter {
            rate_limiter.check(&request.user_address.to_string())?;
        }
        decrypt_handle(&request.handle, kind, &self.key, self.backend.as_ref())
    }

    /// Ask for the current public key. Key rotation is not supported yet, so
    /// the key stays the same.
    pub fn refresh_key(&mut self) {
        self.key = refresh_public_key(&self.key);
    }
}
