// The amount of bytes in the placeholder public key, which prefixes every ciphertext
pub const KEY_PREFIX_LEN: usize = 32;
// The amount of bytes in a (mock) proof of ciphertext well-formedness
pub const PROOF_LEN: usize = 64;
pub const ADDRESS_LEN: usize = 20;

pub const PLACEHOLDER_KEY_VERSION: &str = "placeholder-v1";
pub(crate) const PLACEHOLDER_KEY_DSEP: &[u8] = b"fhevm-sdk/placeholder-public-key";

// EIP-712 domain of decryption authorizations
pub const DECRYPTION_DOMAIN_NAME: &str = "Decryption";
pub const DECRYPTION_DOMAIN_VERSION: &str = "1";

pub const SEPOLIA_CHAIN_ID: u64 = 11155111;
pub const LOCAL_CHAIN_ID: u64 = 31337;

// Prefix of the environment variables overriding the configuration files
pub const ENV_PREFIX: &str = "FHEVM_SDK";
pub const DEFAULT_SERVICE_NAME: &str = "fhevm_sdk";
