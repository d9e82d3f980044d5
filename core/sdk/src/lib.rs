//! Client SDK for FHE-enabled smart contracts: validation and encryption of
//! contract inputs, ABI encoding of the resulting calls, EIP-712 decryption
//! authorizations and decryption of handles.
//!
//! The cipher is a placeholder ([`cryptography::cipher::MockCipher`]) behind the
//! [`cryptography::cipher::CipherBackend`] trait.

pub mod client;
pub mod codec;
pub mod conf;
pub mod consts;
pub mod contract;
pub mod decryption;
pub mod error;
pub mod input;
pub mod key;
pub mod solidity_types;
pub mod types;
pub mod validation;

pub mod cryptography {
    pub mod authorization;
    pub mod cipher;
}
pub mod util {
    pub mod rate_limiter;
}

pub use client::FhevmSdk;
pub use error::{Result, SdkError};
pub use types::{BatchedEncryptedInput, ClearInput, EncryptedPayload, FheValueKind, TypedValue};
