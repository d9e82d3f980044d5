/// Constants for operation names to ensure consistency and prevent typos.
/// They are used as span names so that log lines of one operation can be correlated.
//
// Encryption Operations
pub const OP_ENCRYPT: &str = "encrypt";
pub const OP_ENCRYPT_INPUT: &str = "encrypt_input";

// Decryption Operations
// Corresponds to a request, a request may contain several handles
pub const OP_DECRYPT: &str = "decrypt";
pub const OP_BATCH_DECRYPT: &str = "batch_decrypt";
pub const OP_USER_DECRYPT: &str = "user_decrypt";

// Authorization Operations
pub const OP_SIGN_AUTHORIZATION: &str = "sign_authorization";
pub const OP_VERIFY_AUTHORIZATION: &str = "verify_authorization";

// PK fetch
pub const OP_FETCH_PK: &str = "fetch_pk";
pub const OP_REFRESH_PK: &str = "refresh_pk";
