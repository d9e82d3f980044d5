use crate::codec::{decode, encode};
use crate::consts::{KEY_PREFIX_LEN, PROOF_LEN};
use crate::error::{error_and_warn_log, Result, SdkError};
use crate::key::KeyMaterial;
use crate::types::{EncryptedPayload, FheValueKind, TypedValue};

/// Produces ciphertexts and proofs of well-formedness for validated values.
///
/// The validation, encoding and builder layers only rely on the byte layout
/// of [`EncryptedPayload`]: `data` starts with the [`KEY_PREFIX_LEN`] bytes of
/// the public key and `proof` is [`PROOF_LEN`] bytes long.
pub trait CipherBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn encrypt(&self, value: &TypedValue, key: &KeyMaterial) -> Result<EncryptedPayload>;

    fn decrypt(&self, data: &[u8], kind: FheValueKind, key: &KeyMaterial) -> Result<TypedValue>;
}

/// Placeholder backend: the "ciphertext" is the key followed by the clear
/// encoding, and the proof is an XOR fold of both.
///
/// WARNING: this provides neither confidentiality nor soundness.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockCipher;

impl MockCipher {
    /// `proof[i] = combined[i mod combined.len()] ^ (i & 0xff)` with
    /// `combined = encoded || public_key`.
    pub fn proof(encoded: &[u8], key: &KeyMaterial) -> Vec<u8> {
        let combined: Vec<u8> = encoded
            .iter()
            .chain(key.public_key().iter())
            .copied()
            .collect();
        (0..PROOF_LEN)
            .map(|i| combined[i % combined.len()] ^ (i & 0xff) as u8)
            .collect()
    }
}

impl CipherBackend for MockCipher {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn encrypt(&self, value: &TypedValue, key: &KeyMaterial) -> Result<EncryptedPayload> {
        let encoded = encode(value);
        let proof = Self::proof(&encoded, key);
        let mut data = Vec::with_capacity(KEY_PREFIX_LEN + encoded.len());
        data.extend_from_slice(key.public_key());
        data.extend_from_slice(&encoded);
        tracing::debug!(
            "Mock-encrypted {} into {} bytes with key version {}",
            value.kind(),
            data.len(),
            key.version()
        );
        Ok(EncryptedPayload {
            data,
            proof,
            kind: value.kind(),
        })
    }

    /// The ciphertext must be exactly the key followed by `kind.byte_width()`
    /// bytes: a longer one was produced for a wider type.
    fn decrypt(&self, data: &[u8], kind: FheValueKind, key: &KeyMaterial) -> Result<TypedValue> {
        let body = match data.get(..KEY_PREFIX_LEN) {
            Some(prefix) if prefix == key.public_key() => &data[KEY_PREFIX_LEN..],
            _ => return Err(error_and_warn_log(SdkError::InvalidKeyPrefix)),
        };
        if body.len() > kind.byte_width() {
            return Err(error_and_warn_log(SdkError::InvalidFormat(format!(
                "ciphertext holds {} value bytes, {kind} takes {}",
                body.len(),
                kind.byte_width()
            ))));
        }
        decode(body, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn test_key(byte: u8) -> KeyMaterial {
        KeyMaterial::new([byte; KEY_PREFIX_LEN], "test", 31337)
    }

    #[test]
    fn layout() {
        let key = test_key(7);
        let payload = MockCipher.encrypt(&TypedValue::Uint16(0x0102), &key).unwrap();
        assert_eq!(payload.kind, FheValueKind::Uint16);
        assert_eq!(payload.data.len(), KEY_PREFIX_LEN + 2);
        assert_eq!(&payload.data[..KEY_PREFIX_LEN], key.public_key());
        assert_eq!(&payload.data[KEY_PREFIX_LEN..], &[0x02u8, 0x01]);
        assert_eq!(payload.proof.len(), PROOF_LEN);
    }

    #[test]
    fn proof_is_an_xor_fold() {
        let key = test_key(0);
        let proof = MockCipher::proof(&[0xff], &key);
        // combined = [0xff, 0 x 32], length 33
        assert_eq!(proof[0], 0xff);
        assert_eq!(proof[1], 0x01);
        assert_eq!(proof[32], 32);
        assert_eq!(proof[33], 0xff ^ 33);
        assert_eq!(proof[63], 63);
    }

    #[test]
    fn proof_is_deterministic() {
        let key = test_key(9);
        let value = TypedValue::Address(address!("66f9664f97F2b50F62D13eA064982f936dE76657"));
        let a = MockCipher.encrypt(&value, &key).unwrap();
        let b = MockCipher.encrypt(&value, &key).unwrap();
        assert_eq!(a, b);

        let other_key = MockCipher.encrypt(&value, &test_key(10)).unwrap();
        assert_ne!(a.proof, other_key.proof);
    }

    #[test]
    fn decrypt_round_trip() {
        let key = test_key(3);
        for value in [
            TypedValue::Bool(true),
            TypedValue::Uint8(5),
            TypedValue::Uint32(1000),
            TypedValue::Uint64(u64::MAX),
        ] {
            let payload = MockCipher.encrypt(&value, &key).unwrap();
            assert_eq!(
                MockCipher.decrypt(&payload.data, value.kind(), &key).unwrap(),
                value
            );
        }
    }

    #[test]
    fn decrypt_checks_the_width() {
        let key = test_key(4);
        let wide = MockCipher
            .encrypt(&TypedValue::Uint64(1_000_000), &key)
            .unwrap();
        for narrower in [
            FheValueKind::Bool,
            FheValueKind::Uint8,
            FheValueKind::Uint16,
            FheValueKind::Uint32,
        ] {
            assert!(
                matches!(
                    MockCipher.decrypt(&wide.data, narrower, &key),
                    Err(SdkError::InvalidFormat(_))
                ),
                "{narrower}"
            );
        }

        let narrow = MockCipher.encrypt(&TypedValue::Uint8(64), &key).unwrap();
        assert!(matches!(
            MockCipher.decrypt(&narrow.data, FheValueKind::Uint64, &key),
            Err(SdkError::InsufficientBytes { .. })
        ));

        let mut padded = narrow.data.clone();
        padded.push(0);
        assert!(matches!(
            MockCipher.decrypt(&padded, FheValueKind::Uint8, &key),
            Err(SdkError::InvalidFormat(_))
        ));
    }

    #[test]
    fn decrypt_checks_the_key() {
        let payload = MockCipher.encrypt(&TypedValue::Uint8(1), &test_key(1)).unwrap();
        assert_eq!(
            MockCipher.decrypt(&payload.data, FheValueKind::Uint8, &test_key(2)),
            Err(SdkError::InvalidKeyPrefix)
        );
        assert_eq!(
            MockCipher.decrypt(&payload.data[..10], FheValueKind::Uint8, &test_key(1)),
            Err(SdkError::InvalidKeyPrefix)
        );
        // key present but no value bytes
        assert!(matches!(
            MockCipher.decrypt(&payload.data[..KEY_PREFIX_LEN], FheValueKind::Uint8, &test_key(1)),
            Err(SdkError::InsufficientBytes { .. })
        ));
    }
}
