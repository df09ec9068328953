// Path: crates/vladiator-crypto/src/sign/mod.rs

pub mod evm;
pub mod substrate;
