use crate::error::Error;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::str::FromStr;

/// Supported mnemonic lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicType {
    /// 12 words (128-bit entropy)
    Words12,
    /// 24 words (256-bit entropy)
    Words24,
}

impl MnemonicType {
    /// Map an entropy size in bits to a mnemonic length
    pub fn from_entropy_bits(bits: usize) -> Result<Self, Error> {
        match bits {
            128 => Ok(MnemonicType::Words12),
            256 => Ok(MnemonicType::Words24),
            other => Err(Error::InvalidEntropySize(other)),
        }
    }

    pub fn entropy_bits(&self) -> usize {
        match self {
            MnemonicType::Words12 => 128,
            MnemonicType::Words24 => 256,
        }
    }

    pub fn entropy_bytes(&self) -> usize {
        self.entropy_bits() / 8
    }

    pub fn word_count(&self) -> usize {
        match self {
            MnemonicType::Words12 => 12,
            MnemonicType::Words24 => 24,
        }
    }
}

/// A validated BIP-39 mnemonic phrase. Wordlist lookup, checksum
/// validation and PBKDF2 seed stretching are delegated to the `bip39`
/// crate; this type owns the entropy sizing and sequencing rules.
#[derive(Clone)]
pub struct Mnemonic {
    inner: bip39::Mnemonic,
}

impl Mnemonic {
    /// Generate a new random mnemonic from OS entropy
    pub fn generate(mnemonic_type: MnemonicType) -> Result<Self, Error> {
        let mut entropy = [0u8; 32];
        let len = mnemonic_type.entropy_bytes();
        OsRng.fill_bytes(&mut entropy[..len]);
        Self::from_entropy(&entropy[..len])
    }

    /// Build a mnemonic from raw entropy (16 or 32 bytes)
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, Error> {
        MnemonicType::from_entropy_bits(entropy.len() * 8)?;
        let inner = bip39::Mnemonic::from_entropy(entropy)
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
        Ok(Mnemonic { inner })
    }

    /// Parse and validate an existing phrase (wordlist and checksum)
    pub fn from_phrase(phrase: &str) -> Result<Self, Error> {
        let inner = bip39::Mnemonic::parse(phrase)
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
        Ok(Mnemonic { inner })
    }

    /// The phrase as a single space-separated string
    pub fn phrase(&self) -> String {
        self.inner.to_string()
    }

    /// The phrase as an ordered word list
    pub fn words(&self) -> Vec<String> {
        self.phrase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.words().len()
    }

    /// Stretch the phrase into a 64-byte binary seed (PBKDF2-HMAC-SHA512)
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        Seed(self.inner.to_seed(passphrase))
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

// Phrase deliberately withheld from debug output
impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .field("phrase", &"<redacted>")
            .finish()
    }
}

impl FromStr for Mnemonic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mnemonic::from_phrase(s)
    }
}

/// The binary seed derived from a mnemonic, root input of the key tree
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; 64]);

impl Seed {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn generate_word_counts() {
        let twelve = Mnemonic::generate(MnemonicType::Words12).unwrap();
        assert_eq!(twelve.word_count(), MnemonicType::Words12.word_count());

        let twenty_four = Mnemonic::generate(MnemonicType::Words24).unwrap();
        assert_eq!(twenty_four.word_count(), MnemonicType::Words24.word_count());
    }

    #[test]
    fn generated_mnemonics_are_unique() {
        let a = Mnemonic::generate(MnemonicType::Words12).unwrap();
        let b = Mnemonic::generate(MnemonicType::Words12).unwrap();
        assert_ne!(a.phrase(), b.phrase());
    }

    #[test]
    fn entropy_bits_mapping() {
        assert_eq!(
            MnemonicType::from_entropy_bits(128).unwrap(),
            MnemonicType::Words12
        );
        assert_eq!(
            MnemonicType::from_entropy_bits(256).unwrap(),
            MnemonicType::Words24
        );
        assert!(matches!(
            MnemonicType::from_entropy_bits(192),
            Err(Error::InvalidEntropySize(192))
        ));
    }

    #[test]
    fn rejects_bad_checksum() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(matches!(
            Mnemonic::from_phrase(phrase),
            Err(Error::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn rejects_unknown_word() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon zzzzzz";
        assert!(Mnemonic::from_phrase(phrase).is_err());
    }

    #[test]
    fn words_preserve_order() {
        let mnemonic = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        let words = mnemonic.words();
        assert_eq!(words.len(), 12);
        assert_eq!(words[0], "abandon");
        assert_eq!(words[11], "about");
    }

    #[test]
    fn seed_with_passphrase() {
        // Known good seed from the BIP-39 spec
        let mnemonic = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        let seed = mnemonic.to_seed("TREZOR");
        assert_eq!(
            seed.to_hex(),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn seed_without_passphrase() {
        let mnemonic = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        let seed = mnemonic.to_seed("");
        assert_eq!(
            seed.to_hex(),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn debug_does_not_leak_phrase() {
        let mnemonic = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        let debug_output = format!("{:?}", mnemonic);
        assert!(!debug_output.contains("abandon"));

        let seed_output = format!("{:?}", mnemonic.to_seed(""));
        assert!(!seed_output.contains("5eb00bbd"));
    }
}
