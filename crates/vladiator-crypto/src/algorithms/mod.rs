// Path: crates/vladiator-crypto/src/algorithms/mod.rs

/// Hash functions, chiefly Keccak-256 for the canonical signing digest.
pub mod hash;
