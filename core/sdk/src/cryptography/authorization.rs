//! EIP-712 authorizations binding a decryption request to its requester.
//!
//! The signer recovered from a [`DecryptionAuthorization`] must be the user
//! named in the request. Whether that user is also allowed to read the handle
//! on-chain is decided by the ACL contract behind the gateway, not here.
use crate::consts::{DECRYPTION_DOMAIN_NAME, DECRYPTION_DOMAIN_VERSION};
use crate::error::{error_and_log, Result, SdkError};
use crate::solidity_types::Decryption;
use crate::types::handle_to_bytes;
use alloy_primitives::{Address, U256};
use alloy_signer::{Signer, SignerSync};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{Eip712Domain, SolStruct};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const ERR_USER_ADDR_EQ_CONTRACT_ADDR: &str =
    "user address is the same as the contract address";
const ERR_SIGNER_IS_NOT_USER: &str = "signer address differs from the user address";

/// What the user asks to decrypt, and where it lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionRequest {
    pub handle: String,
    pub contract_address: Address,
    pub user_address: Address,
}

impl DecryptionRequest {
    pub fn new(handle: impl Into<String>, contract_address: Address, user_address: Address) -> Self {
        Self {
            handle: handle.into(),
            contract_address,
            user_address,
        }
    }

    /// The EIP-712 message for this request.
    pub fn to_message(&self) -> Result<Decryption> {
        Ok(Decryption {
            handle: handle_to_bytes(&self.handle)?.into(),
            contractAddress: self.contract_address,
            userAddress: self.user_address,
        })
    }
}

/// A request together with the user's signature over it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionAuthorization {
    #[serde(flatten)]
    pub request: DecryptionRequest,
    /// `0x`-prefixed hex of r || s || v.
    pub signature: String,
}

impl DecryptionAuthorization {
    /// Whether the signature was produced by the user named in the request.
    pub fn is_valid(&self, chain_id: u64) -> bool {
        verify_authorization(self, chain_id, &self.request.user_address)
    }
}

/// The domain decryption requests are signed under, scoped to one contract on one chain.
pub fn decryption_domain(chain_id: u64, contract_address: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(DECRYPTION_DOMAIN_NAME.into()),
        Some(DECRYPTION_DOMAIN_VERSION.into()),
        Some(U256::from(chain_id)),
        Some(contract_address),
        None,
    )
}

/// Sign `request` on behalf of its user.
pub fn sign_authorization(
    request: DecryptionRequest,
    signer: &PrivateKeySigner,
    chain_id: u64,
) -> Result<DecryptionAuthorization> {
    // this is to prevent malicious dapp
    if request.user_address == request.contract_address {
        return Err(error_and_log(SdkError::Signing(format!(
            "{ERR_USER_ADDR_EQ_CONTRACT_ADDR}: {}",
            request.user_address
        ))));
    }
    if signer.address() != request.user_address {
        return Err(error_and_log(SdkError::Signing(format!(
            "{ERR_SIGNER_IS_NOT_USER}: {} != {}",
            signer.address(),
            request.user_address
        ))));
    }

    let message = request.to_message()?;
    let domain = decryption_domain(chain_id, request.contract_address);
    let message_hash = message.eip712_signing_hash(&domain);
    let signature = signer
        .sign_hash_sync(&message_hash)
        .map_err(|e| error_and_log(SdkError::Signing(e.to_string())))?;
    tracing::debug!(
        "🔒 Signed decryption request for {} on contract {}",
        request.handle,
        request.contract_address
    );

    Ok(DecryptionAuthorization {
        request,
        signature: format!("0x{}", hex::encode(signature.as_bytes())),
    })
}

/// Check that `authorization` was signed by `expected_signer`.
///
/// Never fails: malformed signatures, recovery errors and mismatches all
/// yield `false`. Addresses are compared as values, so the casing of the
/// original strings is irrelevant.
pub fn verify_authorization(
    authorization: &DecryptionAuthorization,
    chain_id: u64,
    expected_signer: &Address,
) -> bool {
    match recover_signer(authorization, chain_id) {
        Ok(recovered) if recovered == *expected_signer => true,
        Ok(recovered) => {
            tracing::debug!(
                "🔒 Authorization signed by {recovered}, expected {expected_signer}"
            );
            false
        }
        Err(e) => {
            tracing::debug!("🔒 Authorization rejected: {e}");
            false
        }
    }
}

/// Recover the address that signed `authorization`.
pub fn recover_signer(
    authorization: &DecryptionAuthorization,
    chain_id: u64,
) -> anyhow::Result<Address> {
    let request = &authorization.request;
    if request.user_address == request.contract_address {
        anyhow::bail!("{ERR_USER_ADDR_EQ_CONTRACT_ADDR}: {}", request.user_address);
    }

    let signature_bytes = hex::decode(
        authorization
            .signature
            .strip_prefix("0x")
            .unwrap_or(&authorization.signature),
    )
    .context("signature is not valid hex")?;
    let signature = alloy_primitives::Signature::try_from(signature_bytes.as_slice())
        .context("failed to parse signature")?;

    // Reject high-s signatures, they are malleable copies of valid ones
    let k256_signature = signature.to_k256()?;
    if k256_signature.normalize_s().is_some() {
        anyhow::bail!("signature {} is not normalized", authorization.signature);
    }

    let message = request.to_message()?;
    let domain = decryption_domain(chain_id, request.contract_address);
    let message_hash = message.eip712_signing_hash(&domain);
    let recovered = signature.recover_address_from_prehash(&message_hash)?;
    tracing::debug!("🔒 Recovered address: {:?}", recovered);
    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes_prng::AesRng;
    use alloy_primitives::address;
    use rand::SeedableRng;

    const CHAIN_ID: u64 = 8006;
    const CONTRACT: Address = address!("66f9664f97F2b50F62D13eA064982f936dE76657");
    const HANDLE: &str = "0x0102030405";

    fn signer(seed: u64) -> PrivateKeySigner {
        let mut rng = AesRng::seed_from_u64(seed);
        PrivateKeySigner::from_signing_key(k256::ecdsa::SigningKey::random(&mut rng))
    }

    fn signed(seed: u64) -> (PrivateKeySigner, DecryptionAuthorization) {
        let signer = signer(seed);
        let request = DecryptionRequest::new(HANDLE, CONTRACT, signer.address());
        let auth = sign_authorization(request, &signer, CHAIN_ID).unwrap();
        (signer, auth)
    }

    #[test]
    fn sign_then_verify() {
        let (signer_a, auth) = signed(1);
        assert!(verify_authorization(&auth, CHAIN_ID, &signer_a.address()));
        assert!(auth.is_valid(CHAIN_ID));
        assert_eq!(recover_signer(&auth, CHAIN_ID).unwrap(), signer_a.address());
        // r || s || v
        assert_eq!(auth.signature.len(), 2 + 2 * 65);
    }

    #[test]
    fn other_signer_is_rejected() {
        let (_, auth) = signed(1);
        let signer_b = signer(2);
        assert!(!verify_authorization(&auth, CHAIN_ID, &signer_b.address()));
    }

    #[test]
    fn expected_signer_casing_is_irrelevant() {
        let (signer_a, auth) = signed(3);
        let lower = signer_a.address().to_string().to_lowercase();
        let parsed = crate::validation::parse_address(&lower).unwrap();
        assert!(verify_authorization(&auth, CHAIN_ID, &parsed));
    }

    #[test]
    fn signature_is_bound_to_domain_and_message() {
        let (signer_a, auth) = signed(4);
        // other chain
        assert!(!verify_authorization(&auth, CHAIN_ID + 1, &signer_a.address()));
        // other contract
        let mut moved = auth.clone();
        moved.request.contract_address = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        assert!(!moved.is_valid(CHAIN_ID));
        // other handle
        let mut other_handle = auth.clone();
        other_handle.request.handle = "0x0102030406".to_string();
        assert!(!other_handle.is_valid(CHAIN_ID));
        // claimed user differs from the signer
        let mut other_user = auth;
        other_user.request.user_address = signer(5).address();
        assert!(!other_user.is_valid(CHAIN_ID));
    }

    #[test]
    #[tracing_test::traced_test]
    fn corrupted_signatures_return_false() {
        let (signer_a, auth) = signed(6);
        let expected = signer_a.address();

        let mut flipped = auth.clone();
        let mut bytes = hex::decode(&flipped.signature[2..]).unwrap();
        bytes[0] ^= 1;
        flipped.signature = format!("0x{}", hex::encode(bytes));
        assert!(!verify_authorization(&flipped, CHAIN_ID, &expected));

        for garbage in ["", "0x", "0xzz", "not a signature", "0x1234"] {
            let mut bad = auth.clone();
            bad.signature = garbage.to_string();
            assert!(!verify_authorization(&bad, CHAIN_ID, &expected), "{garbage}");
        }

        let mut bad_handle = auth;
        bad_handle.request.handle = "0xnothex".to_string();
        assert!(!verify_authorization(&bad_handle, CHAIN_ID, &expected));
        assert!(logs_contain("Authorization rejected"));
    }

    #[test]
    fn high_s_signature_is_rejected() {
        let (signer_a, auth) = signed(7);
        let bytes = hex::decode(&auth.signature[2..]).unwrap();
        let signature = alloy_primitives::Signature::try_from(bytes.as_slice()).unwrap();
        let k = signature.to_k256().unwrap();
        let high_s = k256::ecdsa::Signature::from_scalars(k.r(), k.s().negate()).unwrap();
        let malleated =
            alloy_primitives::Signature::from_signature_and_parity(high_s, !signature.v());
        let mut bad = auth;
        bad.signature = format!("0x{}", hex::encode(malleated.as_bytes()));
        assert!(!verify_authorization(&bad, CHAIN_ID, &signer_a.address()));
    }

    #[test]
    fn signing_refuses_bad_requests() {
        let signer_a = signer(8);

        let same = DecryptionRequest::new(HANDLE, signer_a.address(), signer_a.address());
        let err = sign_authorization(same, &signer_a, CHAIN_ID).unwrap_err();
        assert!(err.to_string().contains(ERR_USER_ADDR_EQ_CONTRACT_ADDR));

        let for_someone_else = DecryptionRequest::new(HANDLE, CONTRACT, signer(9).address());
        let err = sign_authorization(for_someone_else, &signer_a, CHAIN_ID).unwrap_err();
        assert!(err.to_string().contains(ERR_SIGNER_IS_NOT_USER));

        let bad_handle = DecryptionRequest::new("0xqq", CONTRACT, signer_a.address());
        assert!(matches!(
            sign_authorization(bad_handle, &signer_a, CHAIN_ID),
            Err(SdkError::InvalidFormat(_))
        ));
    }

    #[test]
    fn json_shape() {
        let (_, auth) = signed(10);
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["handle"], HANDLE);
        assert!(json["contractAddress"].is_string());
        assert!(json["userAddress"].is_string());
        let back: DecryptionAuthorization = serde_json::from_value(json).unwrap();
        assert_eq!(back, auth);
    }
}
