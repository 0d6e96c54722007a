use crate::address;
use crate::bip32::{ChildNumber, DerivationPath, ExtendedPrivKey, ExtendedPubKey, Network};
use crate::error::Error;
use crate::mnemonic::{Mnemonic, MnemonicType, Seed};
use crate::wallet::Wallet;
use std::str::FromStr;

/// One derivation session: a parsed path plus the master key and the
/// "root child" key (master walked along the path). Construction always
/// yields a fully derived value; a failed constructor leaves nothing
/// behind. Sessions imported from an extended key carry no mnemonic or
/// seed, which is the only way the corresponding accessors can fail.
///
/// Deriving different indices from the same session is a pure function
/// of (root child, index), so a shared reference can be used from many
/// threads at once.
pub struct HdWallet {
    path: DerivationPath,
    mnemonic: Option<Mnemonic>,
    seed: Option<Seed>,
    master_key: ExtendedPrivKey,
    root_child_key: ExtendedPrivKey,
}

impl HdWallet {
    /// Create a session from a freshly generated random mnemonic
    pub fn generate(path: &str, mnemonic_type: MnemonicType) -> Result<Self, Error> {
        Self::build(path, Mnemonic::generate(mnemonic_type)?, "")
    }

    /// Create a session from an existing mnemonic phrase
    pub fn from_mnemonic(path: &str, phrase: &str) -> Result<Self, Error> {
        Self::build(path, Mnemonic::from_phrase(phrase)?, "")
    }

    /// Create a session from a mnemonic phrase and a BIP-39 passphrase
    pub fn from_mnemonic_with_passphrase(
        path: &str,
        phrase: &str,
        passphrase: &str,
    ) -> Result<Self, Error> {
        Self::build(path, Mnemonic::from_phrase(phrase)?, passphrase)
    }

    /// Re-enter the tree from an exported extended private key, bypassing
    /// seed derivation. The decoded key becomes the session master.
    pub fn from_extended_private_key(path: &str, xprv: &str) -> Result<Self, Error> {
        let path = DerivationPath::from_str(path)?;
        let master_key = ExtendedPrivKey::from_str(xprv)?;
        let root_child_key = master_key.derive_path(&path)?;

        Ok(HdWallet {
            path,
            mnemonic: None,
            seed: None,
            master_key,
            root_child_key,
        })
    }

    fn build(path: &str, mnemonic: Mnemonic, passphrase: &str) -> Result<Self, Error> {
        let path = DerivationPath::from_str(path)?;
        let seed = mnemonic.to_seed(passphrase);
        let master_key = ExtendedPrivKey::new_master(seed.as_bytes(), Network::Mainnet)?;
        let root_child_key = master_key.derive_path(&path)?;

        Ok(HdWallet {
            path,
            mnemonic: Some(mnemonic),
            seed: Some(seed),
            master_key,
            root_child_key,
        })
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// The session mnemonic as a single phrase
    pub fn mnemonic_phrase(&self) -> Result<String, Error> {
        self.mnemonic
            .as_ref()
            .map(Mnemonic::phrase)
            .ok_or(Error::MnemonicNotSet)
    }

    /// The session mnemonic as an ordered word list
    pub fn mnemonic_words(&self) -> Result<Vec<String>, Error> {
        self.mnemonic
            .as_ref()
            .map(Mnemonic::words)
            .ok_or(Error::MnemonicNotSet)
    }

    /// The binary seed as a hex string
    pub fn seed_hex(&self) -> Result<String, Error> {
        self.seed.as_ref().map(Seed::to_hex).ok_or(Error::SeedNotSet)
    }

    pub fn master_xprv(&self) -> String {
        self.master_key.to_string()
    }

    pub fn master_xpub(&self) -> String {
        self.master_key.to_extended_public_key().to_string()
    }

    pub fn root_xprv(&self) -> String {
        self.root_child_key.to_string()
    }

    pub fn root_xpub(&self) -> String {
        self.root_child_key.to_extended_public_key().to_string()
    }

    /// Derive the wallet at `index` under the root child key. This is the
    /// hot path for sequential account generation.
    pub fn wallet_at(&self, index: u32) -> Result<Wallet, Error> {
        let child = self.root_child_key.derive_child(address_index(index)?)?;
        Ok(Wallet::from_extended_key(&child))
    }

    /// Derive an address from an external extended public key: walk the
    /// session path, then the index. Any hardened step fails, since only
    /// key material for normal derivation is available.
    pub fn address_from_xpub(&self, xpub: &str, index: u32) -> Result<String, Error> {
        let key = ExtendedPubKey::from_str(xpub)?;
        let child = key
            .derive_path(&self.path)?
            .derive_child(address_index(index)?)?;
        Ok(address::from_public_key(&child.public_key))
    }

    /// Derive a full wallet from an external extended private key: walk
    /// the session path (hardened steps allowed), then the index.
    pub fn wallet_from_xprv(&self, xprv: &str, index: u32) -> Result<Wallet, Error> {
        let key = ExtendedPrivKey::from_str(xprv)?;
        let child = key
            .derive_path(&self.path)?
            .derive_child(address_index(index)?)?;
        Ok(Wallet::from_extended_key(&child))
    }
}

fn address_index(index: u32) -> Result<ChildNumber, Error> {
    if index > ChildNumber::MAX_NORMAL_INDEX {
        return Err(Error::InvalidDerivationPath(
            "Address index out of range".to_string(),
        ));
    }
    Ok(ChildNumber::Normal(index))
}
