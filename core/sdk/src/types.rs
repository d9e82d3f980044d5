//! Typed values as they flow through the SDK.
//!
//! A [`ClearInput`] is whatever the application hands in, a [`TypedValue`] is
//! the validated form of it and only exists once the value is known to fit its
//! [`FheValueKind`].
use crate::consts::{ADDRESS_LEN, PROOF_LEN};
use crate::error::{error_and_warn_log, Result, SdkError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The encrypted types supported by the platform.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum FheValueKind {
    #[strum(to_string = "ebool")]
    #[serde(rename = "ebool")]
    Bool,
    #[strum(to_string = "euint8")]
    #[serde(rename = "euint8")]
    Uint8,
    #[strum(to_string = "euint16")]
    #[serde(rename = "euint16")]
    Uint16,
    #[strum(to_string = "euint32")]
    #[serde(rename = "euint32")]
    Uint32,
    #[strum(to_string = "euint64")]
    #[serde(rename = "euint64")]
    Uint64,
    #[strum(to_string = "eaddress")]
    #[serde(rename = "eaddress")]
    Address,
}

impl FheValueKind {
    /// Number of bytes of the little-endian encoding.
    pub fn byte_width(&self) -> usize {
        match self {
            FheValueKind::Bool | FheValueKind::Uint8 => 1,
            FheValueKind::Uint16 => 2,
            FheValueKind::Uint32 => 4,
            FheValueKind::Uint64 => 8,
            FheValueKind::Address => ADDRESS_LEN,
        }
    }

    pub fn num_bits(&self) -> usize {
        match self {
            FheValueKind::Bool => 1,
            FheValueKind::Uint8 => 8,
            FheValueKind::Uint16 => 16,
            FheValueKind::Uint32 => 32,
            FheValueKind::Uint64 => 64,
            FheValueKind::Address => 160,
        }
    }

    /// Largest legal value for the integer kinds, `None` otherwise.
    pub fn max_integer(&self) -> Option<u64> {
        match self {
            FheValueKind::Uint8 => Some(u8::MAX as u64),
            FheValueKind::Uint16 => Some(u16::MAX as u64),
            FheValueKind::Uint32 => Some(u32::MAX as u64),
            FheValueKind::Uint64 => Some(u64::MAX),
            FheValueKind::Bool | FheValueKind::Address => None,
        }
    }
}

/// An application value before validation.
///
/// Integers are carried as `i128` so that negative numbers and values just
/// above `u64::MAX` can be represented, and rejected, instead of wrapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClearInput {
    Integer(i128),
    Bool(bool),
    Text(String),
    Address(Address),
}

impl ClearInput {
    /// Short description of the runtime type, used in validation errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            ClearInput::Integer(_) => "integer",
            ClearInput::Bool(_) => "boolean",
            ClearInput::Text(_) => "string",
            ClearInput::Address(_) => "address",
        }
    }
}

impl fmt::Display for ClearInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClearInput::Integer(v) => write!(f, "{v}"),
            ClearInput::Bool(v) => write!(f, "{v}"),
            ClearInput::Text(v) => write!(f, "{v:?}"),
            ClearInput::Address(v) => write!(f, "{}", v.to_checksum(None)),
        }
    }
}

macro_rules! impl_clear_input_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ClearInput {
                fn from(value: $t) -> Self {
                    ClearInput::Integer(value as i128)
                }
            }
        )*
    };
}

impl_clear_input_from_int!(u8, u16, u32, u64, i8, i16, i32, i64, i128);

impl From<bool> for ClearInput {
    fn from(value: bool) -> Self {
        ClearInput::Bool(value)
    }
}

impl From<&str> for ClearInput {
    fn from(value: &str) -> Self {
        ClearInput::Text(value.to_string())
    }
}

impl From<String> for ClearInput {
    fn from(value: String) -> Self {
        ClearInput::Text(value)
    }
}

impl From<Address> for ClearInput {
    fn from(value: Address) -> Self {
        ClearInput::Address(value)
    }
}

impl From<TypedValue> for ClearInput {
    fn from(value: TypedValue) -> Self {
        match value {
            TypedValue::Bool(v) => ClearInput::Bool(v),
            TypedValue::Uint8(v) => v.into(),
            TypedValue::Uint16(v) => v.into(),
            TypedValue::Uint32(v) => v.into(),
            TypedValue::Uint64(v) => v.into(),
            TypedValue::Address(v) => v.into(),
        }
    }
}

/// A value known to fit its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Address(Address),
}

impl TypedValue {
    pub fn kind(&self) -> FheValueKind {
        match self {
            TypedValue::Bool(_) => FheValueKind::Bool,
            TypedValue::Uint8(_) => FheValueKind::Uint8,
            TypedValue::Uint16(_) => FheValueKind::Uint16,
            TypedValue::Uint32(_) => FheValueKind::Uint32,
            TypedValue::Uint64(_) => FheValueKind::Uint64,
            TypedValue::Address(_) => FheValueKind::Address,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Widens any integer kind to `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            TypedValue::Uint8(v) => Some(*v as u64),
            TypedValue::Uint16(v) => Some(*v as u64),
            TypedValue::Uint32(v) => Some(*v as u64),
            TypedValue::Uint64(v) => Some(*v),
            TypedValue::Bool(_) | TypedValue::Address(_) => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            TypedValue::Address(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypedValue::Bool(v) => write!(f, "{v}"),
            TypedValue::Uint8(v) => write!(f, "{v}"),
            TypedValue::Uint16(v) => write!(f, "{v}"),
            TypedValue::Uint32(v) => write!(f, "{v}"),
            TypedValue::Uint64(v) => write!(f, "{v}"),
            TypedValue::Address(v) => write!(f, "{}", v.to_checksum(None)),
        }
    }
}

/// Output of a single encryption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub data: Vec<u8>,
    pub proof: Vec<u8>,
    pub kind: FheValueKind,
}

impl EncryptedPayload {
    /// The `0x`-prefixed hex rendering of the ciphertext, used to reference it on-chain.
    pub fn handle(&self) -> String {
        bytes_to_handle(&self.data)
    }
}

/// Whether every value of a batch has the same type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchKind {
    Uniform(FheValueKind),
    Mixed,
}

/// Output of [`crate::input::EncryptedInputBuilder::encrypt`], the encrypted
/// arguments of one contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchedEncryptedInput {
    pub handles: Vec<String>,
    pub input_proof: Vec<u8>,
    pub kinds: Vec<FheValueKind>,
}

impl BatchedEncryptedInput {
    /// Type of the first value of the batch.
    ///
    /// This is what callers historically received as the type of the whole
    /// batch; use [`Self::batch_kind`] when the batch may be heterogeneous.
    pub fn kind(&self) -> Option<FheValueKind> {
        self.kinds.first().copied()
    }

    pub fn batch_kind(&self) -> Option<BatchKind> {
        let first = self.kind()?;
        if self.kinds.iter().all(|k| *k == first) {
            Some(BatchKind::Uniform(first))
        } else {
            Some(BatchKind::Mixed)
        }
    }

    /// Proof of the value at `idx`.
    pub fn proof_of(&self, idx: usize) -> Option<&[u8]> {
        self.input_proof.chunks(PROOF_LEN).nth(idx)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

pub fn bytes_to_handle(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a handle, with or without its `0x` prefix, back into bytes.
pub fn handle_to_bytes(handle: &str) -> Result<Vec<u8>> {
    let stripped = handle.strip_prefix("0x").unwrap_or(handle);
    hex::decode(stripped).map_err(|e| {
        error_and_warn_log(SdkError::InvalidFormat(format!(
            "handle {handle} is not valid hex: {e}"
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn kind_names_round_trip() {
        for kind in FheValueKind::iter() {
            let name = kind.to_string();
            assert_eq!(FheValueKind::from_str(&name).unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{name}\""));
        }
        assert!(FheValueKind::from_str("euint4").is_err());
    }

    #[test]
    fn widths() {
        for kind in FheValueKind::iter() {
            match kind {
                FheValueKind::Bool => assert_eq!(kind.byte_width(), 1),
                FheValueKind::Address => assert_eq!(kind.byte_width(), 20),
                _ => assert_eq!(kind.byte_width() * 8, kind.num_bits()),
            }
        }
        assert_eq!(FheValueKind::Uint16.max_integer(), Some(65535));
        assert_eq!(FheValueKind::Bool.max_integer(), None);
    }

    #[test]
    fn batch_kind_reports_mixed() {
        let uniform = BatchedEncryptedInput {
            handles: vec!["0x00".to_string(), "0x01".to_string()],
            input_proof: vec![0; 2 * PROOF_LEN],
            kinds: vec![FheValueKind::Uint8, FheValueKind::Uint8],
        };
        assert_eq!(
            uniform.batch_kind(),
            Some(BatchKind::Uniform(FheValueKind::Uint8))
        );

        let mixed = BatchedEncryptedInput {
            kinds: vec![FheValueKind::Uint8, FheValueKind::Bool],
            ..uniform.clone()
        };
        assert_eq!(mixed.kind(), Some(FheValueKind::Uint8));
        assert_eq!(mixed.batch_kind(), Some(BatchKind::Mixed));
        assert_eq!(mixed.proof_of(1).map(|p| p.len()), Some(PROOF_LEN));
        assert_eq!(mixed.proof_of(2), None);
    }

    #[test]
    fn handles() {
        assert_eq!(bytes_to_handle(&[0xde, 0xad]), "0xdead");
        assert_eq!(handle_to_bytes("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(handle_to_bytes("DEAD").unwrap(), vec![0xde, 0xad]);
        assert!(matches!(
            handle_to_bytes("0xzz"),
            Err(SdkError::InvalidFormat(_))
        ));
    }

    #[test]
    fn typed_value_serialization() {
        let value = TypedValue::Uint32(1000);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"uint32","value":1000}"#);
        let back: TypedValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
