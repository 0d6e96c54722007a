// Hierarchical deterministic wallet derivation.
// This library implements BIP-32 key trees and extended key
// serialization, BIP-39 mnemonic/seed handling, and Ethereum-style
// wallet materialization on top of them.

pub mod address;
pub mod bip32;
pub mod error;
pub mod hd;
pub mod mnemonic;
pub mod utils;
pub mod wallet;

pub use bip32::{ChildNumber, DerivationPath, ExtendedPrivKey, ExtendedPubKey, Network};
pub use error::Error;
pub use hd::HdWallet;
pub use mnemonic::{Mnemonic, MnemonicType, Seed};
pub use wallet::Wallet;

// Re-export types from dependencies that are part of our public API
pub use secp256k1::{self, PublicKey, Secp256k1, SecretKey};
