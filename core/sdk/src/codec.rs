//! Fixed-width little-endian encoding of typed values.
//!
//! `ebool` and `euint8` take one byte, `euint16` two, `euint32` four,
//! `euint64` eight and `eaddress` the 20 raw address bytes.
use crate::error::{error_and_warn_log, Result, SdkError};
use crate::types::{ClearInput, FheValueKind, TypedValue};
use crate::validation::validate;
use alloy_primitives::Address;

pub fn encode(value: &TypedValue) -> Vec<u8> {
    match value {
        TypedValue::Bool(v) => vec![u8::from(*v)],
        TypedValue::Uint8(v) => v.to_le_bytes().to_vec(),
        TypedValue::Uint16(v) => v.to_le_bytes().to_vec(),
        TypedValue::Uint32(v) => v.to_le_bytes().to_vec(),
        TypedValue::Uint64(v) => v.to_le_bytes().to_vec(),
        TypedValue::Address(v) => v.to_vec(),
    }
}

/// Validate `input` as `kind`, then encode it.
pub fn encode_input(input: &ClearInput, kind: FheValueKind) -> Result<Vec<u8>> {
    let value = validate(input, kind)?;
    Ok(encode(&value))
}

/// Inverse of [`encode`].
///
/// Only the first `kind.byte_width()` bytes are read; a shorter buffer is an
/// error.
pub fn decode(bytes: &[u8], kind: FheValueKind) -> Result<TypedValue> {
    let width = kind.byte_width();
    let raw = bytes.get(..width).ok_or_else(|| {
        error_and_warn_log(SdkError::InsufficientBytes {
            kind,
            expected: width,
            actual: bytes.len(),
        })
    })?;

    let value = match kind {
        FheValueKind::Bool => match raw[0] {
            0 => TypedValue::Bool(false),
            1 => TypedValue::Bool(true),
            b => {
                return Err(error_and_warn_log(SdkError::InvalidFormat(format!(
                    "byte {b:#04x} is not a valid {kind}"
                ))))
            }
        },
        FheValueKind::Uint8 => TypedValue::Uint8(raw[0]),
        FheValueKind::Uint16 => TypedValue::Uint16(u16::from_le_bytes(le_array(raw))),
        FheValueKind::Uint32 => TypedValue::Uint32(u32::from_le_bytes(le_array(raw))),
        FheValueKind::Uint64 => TypedValue::Uint64(u64::from_le_bytes(le_array(raw))),
        FheValueKind::Address => TypedValue::Address(Address::from_slice(raw)),
    };
    Ok(value)
}

/// Copies the first N bytes, callers guarantee `raw.len() >= N`.
fn le_array<const N: usize>(raw: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&raw[..N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    #[test]
    fn little_endian_layout() {
        assert_eq!(encode(&TypedValue::Uint16(0x0102)), vec![0x02, 0x01]);
        assert_eq!(
            encode(&TypedValue::Uint32(1000)),
            vec![0xe8, 0x03, 0x00, 0x00]
        );
        assert_eq!(
            encode(&TypedValue::Uint64(1)),
            vec![1, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(encode(&TypedValue::Bool(true)), vec![1]);
        let addr = alloy_primitives::address!("66f9664f97F2b50F62D13eA064982f936dE76657");
        assert_eq!(encode(&TypedValue::Address(addr)), addr.to_vec());
    }

    #[test]
    fn encoded_width_matches_kind() {
        let samples = [
            TypedValue::Bool(false),
            TypedValue::Uint8(7),
            TypedValue::Uint16(7),
            TypedValue::Uint32(7),
            TypedValue::Uint64(7),
            TypedValue::Address(Address::ZERO),
        ];
        for (value, kind) in samples.iter().zip(FheValueKind::iter()) {
            assert_eq!(value.kind(), kind);
            assert_eq!(encode(value).len(), kind.byte_width());
        }
    }

    #[test]
    fn encode_input_validates_first() {
        assert_eq!(
            encode_input(&5.into(), FheValueKind::Uint8).unwrap(),
            vec![5]
        );
        assert!(matches!(
            encode_input(&256.into(), FheValueKind::Uint8),
            Err(SdkError::Validation { .. })
        ));
    }

    #[test]
    fn decode_insufficient_bytes() {
        let err = decode(&[1, 2, 3], FheValueKind::Uint32).unwrap_err();
        assert_eq!(
            err,
            SdkError::InsufficientBytes {
                kind: FheValueKind::Uint32,
                expected: 4,
                actual: 3
            }
        );
        assert!(decode(&[], FheValueKind::Bool).is_err());
        assert!(decode(&[0u8; 19], FheValueKind::Address).is_err());
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        assert_eq!(
            decode(&[0x34, 0x12, 0xff], FheValueKind::Uint16).unwrap(),
            TypedValue::Uint16(0x1234)
        );
    }

    #[test]
    fn decode_rejects_non_canonical_bool() {
        assert!(matches!(
            decode(&[2], FheValueKind::Bool),
            Err(SdkError::InvalidFormat(_))
        ));
    }

    proptest! {
        #[test]
        fn round_trip_u64(v in any::<u64>()) {
            let value = TypedValue::Uint64(v);
            prop_assert_eq!(decode(&encode(&value), FheValueKind::Uint64).unwrap(), value);
        }

        #[test]
        fn round_trip_u32(v in any::<u32>()) {
            let value = TypedValue::Uint32(v);
            prop_assert_eq!(decode(&encode(&value), FheValueKind::Uint32).unwrap(), value);
        }

        #[test]
        fn round_trip_u16(v in any::<u16>()) {
            let value = TypedValue::Uint16(v);
            prop_assert_eq!(decode(&encode(&value), FheValueKind::Uint16).unwrap(), value);
        }

        #[test]
        fn round_trip_address(bytes in any::<[u8; 20]>()) {
            let value = TypedValue::Address(Address::from(bytes));
            prop_assert_eq!(decode(&encode(&value), FheValueKind::Address).unwrap(), value);
        }
    }

    #[test]
    fn round_trip_small_domains() {
        for v in 0..=u8::MAX {
            let value = TypedValue::Uint8(v);
            assert_eq!(decode(&encode(&value), FheValueKind::Uint8).unwrap(), value);
        }
        for b in [false, true] {
            let value = TypedValue::Bool(b);
            assert_eq!(decode(&encode(&value), FheValueKind::Bool).unwrap(), value);
        }
    }
}
