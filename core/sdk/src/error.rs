use crate::types::FheValueKind;
use std::panic::Location;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    #[error("validation error for {kind}: {reason}")]
    Validation { kind: FheValueKind, reason: String },
    #[error("insufficient bytes for {kind}: expected {expected}, got {actual}")]
    InsufficientBytes {
        kind: FheValueKind,
        expected: usize,
        actual: usize,
    },
    #[error("format error: {0}")]
    InvalidFormat(String),
    #[error("ciphertext is not prefixed with the expected public key")]
    InvalidKeyPrefix,
    #[error("no inputs to encrypt")]
    NoInputs,
    #[error("length mismatch: {handles} handles but {kinds} types")]
    LengthMismatch { handles: usize, kinds: usize },
    #[error("signing error: {0}")]
    Signing(String),
    #[error("decryption of {handle} is not authorized for {user}")]
    Unauthorized { handle: String, user: String },
    #[error("rate limit exceeded for {caller}: at most {limit} requests per {window_ms} ms")]
    RateLimited {
        caller: String,
        limit: u32,
        window_ms: u64,
    },
    #[error("invalid contract call: {0}")]
    InvalidCall(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl SdkError {
    pub(crate) fn validation<S: Into<String>>(kind: FheValueKind, reason: S) -> Self {
        SdkError::Validation {
            kind,
            reason: reason.into(),
        }
    }
}

// Errors are logged where they are raised, so that the caller location ends up in the log line.
#[track_caller]
pub(crate) fn error_and_log(err: SdkError) -> SdkError {
    tracing::error!("Error in {}: {}", Location::caller(), err);
    err
}

// Caller mistakes (bad input, exhausted limits) are logged at a lower level.
#[track_caller]
pub(crate) fn error_and_warn_log(err: SdkError) -> SdkError {
    tracing::warn!("Warning in {}: {}", Location::caller(), err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_type_and_bound() {
        let err = SdkError::validation(FheValueKind::Uint8, "value 256 exceeds 255");
        assert_eq!(
            err.to_string(),
            "validation error for euint8: value 256 exceeds 255"
        );

        let err = SdkError::InsufficientBytes {
            kind: FheValueKind::Uint32,
            expected: 4,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient bytes for euint32: expected 4, got 2"
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn logging_helpers_return_the_error() {
        let err = error_and_log(SdkError::NoInputs);
        assert_eq!(err, SdkError::NoInputs);
        assert!(logs_contain("no inputs to encrypt"));

        let err = error_and_warn_log(SdkError::InvalidKeyPrefix);
        assert_eq!(err, SdkError::InvalidKeyPrefix);
        assert!(logs_contain("Warning in"));
    }
}
