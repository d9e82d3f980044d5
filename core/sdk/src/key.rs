use crate::conf::NetworkConfig;
use crate::consts::{KEY_PREFIX_LEN, PLACEHOLDER_KEY_DSEP, PLACEHOLDER_KEY_VERSION};
use crate::error::{error_and_log, Result, SdkError};
use alloy_primitives::keccak256;
use observability::metrics_names::{OP_FETCH_PK, OP_REFRESH_PK};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The network public key every ciphertext is produced under.
///
/// Obtained once when the SDK starts and read-only afterwards. It is passed
/// explicitly to every encryption and decryption call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    public_key: [u8; KEY_PREFIX_LEN],
    version: String,
    chain_id: u64,
}

impl KeyMaterial {
    pub fn new(public_key: [u8; KEY_PREFIX_LEN], version: impl Into<String>, chain_id: u64) -> Self {
        Self {
            public_key,
            version: version.into(),
            chain_id,
        }
    }

    pub fn public_key(&self) -> &[u8; KEY_PREFIX_LEN] {
        &self.public_key
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key", &hex::encode(self.public_key))
            .field("version", &self.version)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Obtain the public key of `network`.
///
/// The gateway key endpoint is not wired up: the key is a placeholder derived
/// from the chain id, so every SDK instance on the same chain agrees on it.
pub fn fetch_public_key(network: &NetworkConfig) -> Result<KeyMaterial> {
    let _span = tracing::info_span!(OP_FETCH_PK, network = %network.name).entered();
    if network.chain_id == 0 {
        return Err(error_and_log(SdkError::Config(format!(
            "network {} has no chain id",
            network.name
        ))));
    }
    let digest = keccak256([PLACEHOLDER_KEY_DSEP, &network.chain_id.to_be_bytes()[..]].concat());
    let key = KeyMaterial::new(digest.0, PLACEHOLDER_KEY_VERSION, network.chain_id);
    tracing::info!(
        "Fetched public key version {} for chain {} (gateway: {:?})",
        key.version,
        key.chain_id,
        network.gateway_url.as_ref().map(|u| u.as_str())
    );
    Ok(key)
}

/// Key rotation is not supported: the current key is returned unchanged.
pub fn refresh_public_key(current: &KeyMaterial) -> KeyMaterial {
    let _span = tracing::info_span!(OP_REFRESH_PK).entered();
    tracing::warn!(
        "Key refresh is not supported, keeping key version {}",
        current.version
    );
    current.clone()
}
