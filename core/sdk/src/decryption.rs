use crate::cryptography::cipher::CipherBackend;
use crate::error::{error_and_log, Result, SdkError};
use crate::key::KeyMaterial;
use crate::types::{handle_to_bytes, FheValueKind, TypedValue};

/// Decrypt the value referenced by `handle`.
pub fn decrypt_handle(
    handle: &str,
    kind: FheValueKind,
    key: &KeyMaterial,
    backend: &dyn CipherBackend,
) -> Result<TypedValue> {
    let data = handle_to_bytes(handle)?;
    backend.decrypt(&data, kind, key)
}

/// Decrypt `handles[i]` as `kinds[i]` for every i.
///
/// Both sequences must have the same length, which is checked before anything
/// is decoded. The first failing handle fails the whole batch.
pub fn batch_decrypt<S: AsRef<str>>(
    handles: &[S],
    kinds: &[FheValueKind],
    key: &KeyMaterial,
    backend: &dyn CipherBackend,
) -> Result<Vec<TypedValue>> {
    if handles.len() != kinds.len() {
        return Err(error_and_log(SdkError::LengthMismatch {
            handles: handles.len(),
            kinds: kinds.len(),
        }));
    }

    handles
        .iter()
        .zip(kinds)
        .enumerate()
        .map(|(idx, (handle, kind))| {
            decrypt_handle(handle.as_ref(), *kind, key, backend).inspect_err(|e| {
                tracing::warn!("Batch decryption failed at index {idx}: {e}");
            })
        })
        .collect()
}
