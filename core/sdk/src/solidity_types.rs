//! Solidity types used in EIP-712 signing and verification.
//! WARNING: any changes to these structures is a breaking change.

// Binds a handle to the contract holding it and the user allowed to decrypt it.
// The name must match the primary type signed by the frontends.
alloy_sol_types::sol! {
    struct Decryption {
        bytes handle;
        address contractAddress;
        address userAddress;
    }
}
