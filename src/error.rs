use thiserror::Error;

/// Error types for HD wallet derivation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid entropy size: {0} bits (expected 128 or 256)")]
    InvalidEntropySize(usize),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Wallet was imported from an extended key and carries no mnemonic")]
    MnemonicNotSet,

    #[error("Wallet was imported from an extended key and carries no seed")]
    SeedNotSet,

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Base58 decoding error: {0}")]
    Base58DecodeError(String),

    #[error("Hardened derivation requires private key")]
    HardenedDerivationRequiresPrivateKey,

    /// The HMAC output at this index does not map onto a usable curve
    /// scalar. Callers following BIP-32 may retry with the next index.
    #[error("Derived key at index {index} is invalid, retry with the next index")]
    InvalidChildKey { index: u32 },
}
