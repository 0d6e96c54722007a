use crate::error::Error;
use crate::utils;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use std::fmt;
use std::str::FromStr;

/// Index offset marking hardened children (the high bit of the u32 space)
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// The network type for HD keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Get the version bytes for extended private keys
    pub fn xprv_version(&self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xAD, 0xE4], // xprv
            Network::Testnet => [0x04, 0x35, 0x83, 0x94], // tprv
        }
    }

    /// Get the version bytes for extended public keys
    pub fn xpub_version(&self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xB2, 0x1E], // xpub
            Network::Testnet => [0x04, 0x35, 0x87, 0xCF], // tpub
        }
    }

    fn from_xprv_version(version: [u8; 4]) -> Option<Self> {
        [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find(|n| n.xprv_version() == version)
    }

    fn from_xpub_version(version: [u8; 4]) -> Option<Self> {
        [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find(|n| n.xpub_version() == version)
    }
}

/// A path element in a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildNumber {
    /// Normal derivation index (0..2^31-1)
    Normal(u32),
    /// Hardened derivation index (2^31..2^32-1)
    Hardened(u32),
}

impl ChildNumber {
    /// Maximum normal index
    pub const MAX_NORMAL_INDEX: u32 = 0x7fff_ffff;

    /// Convert to the raw index value carried in serialized keys
    pub fn to_u32(&self) -> u32 {
        match self {
            ChildNumber::Normal(i) => *i,
            ChildNumber::Hardened(i) => HARDENED_OFFSET | i,
        }
    }

    /// Check if the child number is hardened
    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildNumber::Hardened(_))
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChildNumber::Normal(i) => write!(f, "{}", i),
            ChildNumber::Hardened(i) => write!(f, "{}'", i),
        }
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.ends_with('\'') || s.ends_with('h') {
            let index: u32 = s[..s.len() - 1]
                .parse()
                .map_err(|_| Error::InvalidDerivationPath("Invalid hardened index".to_string()))?;

            if index > ChildNumber::MAX_NORMAL_INDEX {
                return Err(Error::InvalidDerivationPath(
                    "Hardened index out of range".to_string(),
                ));
            }

            Ok(ChildNumber::Hardened(index))
        } else {
            let index: u32 = s
                .parse()
                .map_err(|_| Error::InvalidDerivationPath("Invalid normal index".to_string()))?;

            if index > ChildNumber::MAX_NORMAL_INDEX {
                return Err(Error::InvalidDerivationPath(
                    "Normal index out of range".to_string(),
                ));
            }

            Ok(ChildNumber::Normal(index))
        }
    }
}

/// A BIP-32 derivation path parsed from a string like `m/44'/60'/0'/0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    pub components: Vec<ChildNumber>,
}

impl DerivationPath {
    pub fn new(components: Vec<ChildNumber>) -> Self {
        DerivationPath { components }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when every component can be derived without a private key
    pub fn is_fully_normal(&self) -> bool {
        self.components.iter().all(|c| !c.is_hardened())
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m")?;
        for child in &self.components {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let rest = match path {
            "m" => return Ok(DerivationPath::new(vec![])),
            p if p.starts_with("m/") => &p[2..],
            _ => {
                return Err(Error::InvalidDerivationPath(
                    "Path must start with 'm'".to_string(),
                ))
            }
        };

        let components = rest
            .split('/')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<ChildNumber>())
            .collect::<Result<Vec<ChildNumber>, Error>>()?;

        Ok(DerivationPath::new(components))
    }
}

/// 4-byte key identifier: RIPEMD160(SHA256(pubkey))[0..4]
fn fingerprint(public_key: &PublicKey) -> [u8; 4] {
    let hash = utils::hash160(&public_key.serialize());
    let mut fp = [0u8; 4];
    fp.copy_from_slice(&hash[0..4]);
    fp
}

/// Child private key = (IL + parent) mod n. Fails when IL is not a valid
/// scalar or the sum lands on zero, both of which make the index unusable.
fn tweak_private(parent: &SecretKey, il: &[u8], index: u32) -> Result<SecretKey, Error> {
    let tweak: Scalar = (*parent).into();
    SecretKey::from_slice(il)
        .and_then(|il_key| il_key.add_tweak(&tweak))
        .map_err(|_| Error::InvalidChildKey { index })
}

/// Child public key = IL·G + parent. Same failure modes as [`tweak_private`],
/// plus the point-at-infinity result.
fn tweak_public(
    secp: &Secp256k1<secp256k1::All>,
    parent: &PublicKey,
    il: &[u8],
    index: u32,
) -> Result<PublicKey, Error> {
    let il_key = SecretKey::from_slice(il).map_err(|_| Error::InvalidChildKey { index })?;
    parent
        .combine(&PublicKey::from_secret_key(secp, &il_key))
        .map_err(|_| Error::InvalidChildKey { index })
}

/// Common layout of a decoded extended key, before the key material is
/// interpreted as private or public.
struct RawExtendedKey {
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    key_material: [u8; 33],
}

fn encode_extended(
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: &[u8; 32],
    key_material: &[u8; 33],
) -> String {
    let mut data = Vec::with_capacity(78);
    data.extend_from_slice(&version);
    data.push(depth);
    data.extend_from_slice(&parent_fingerprint);
    data.extend_from_slice(&child_number.to_be_bytes());
    data.extend_from_slice(chain_code);
    data.extend_from_slice(key_material);
    utils::base58check_encode(&data)
}

fn decode_extended(encoded: &str) -> Result<RawExtendedKey, Error> {
    let data = utils::base58check_decode(encoded)?;

    if data.len() != 78 {
        return Err(Error::InvalidExtendedKey(
            "Invalid extended key length".to_string(),
        ));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&data[0..4]);

    let depth = data[4];

    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&data[5..9]);

    let mut child_number_bytes = [0u8; 4];
    child_number_bytes.copy_from_slice(&data[9..13]);

    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&data[13..45]);

    let mut key_material = [0u8; 33];
    key_material.copy_from_slice(&data[45..78]);

    Ok(RawExtendedKey {
        version,
        depth,
        parent_fingerprint,
        child_number: u32::from_be_bytes(child_number_bytes),
        chain_code,
        key_material,
    })
}

/// Extended private key as defined in BIP-32
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPrivKey {
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_number: u32,
    pub chain_code: [u8; 32],
    pub private_key: SecretKey,
    pub network: Network,
}

impl ExtendedPrivKey {
    /// Create a new master extended private key from a seed
    pub fn new_master(seed: &[u8], network: Network) -> Result<Self, Error> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(Error::InvalidSeed(
                "Seed must be between 16 and 64 bytes".to_string(),
            ));
        }

        let hmac_result = utils::hmac_sha512(b"Bitcoin seed", seed);
        let (il, ir) = hmac_result.split_at(32);

        // A zero or out-of-range master scalar rejects the whole seed
        let private_key = SecretKey::from_slice(il)
            .map_err(|_| Error::InvalidSeed("Master key scalar out of range".to_string()))?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(ExtendedPrivKey {
            depth: 0,
            parent_fingerprint: [0, 0, 0, 0],
            child_number: 0,
            chain_code,
            private_key,
            network,
        })
    }

    /// Derive a child key (CKDpriv)
    pub fn derive_child(&self, child_number: ChildNumber) -> Result<ExtendedPrivKey, Error> {
        let secp = Secp256k1::new();
        let index = child_number.to_u32();
        let parent_public_key = PublicKey::from_secret_key(&secp, &self.private_key);

        let mut hmac_input = Vec::with_capacity(37);
        if child_number.is_hardened() {
            // Hardened derivation: data = 0x00 || private_key || index
            hmac_input.push(0);
            hmac_input.extend_from_slice(&self.private_key[..]);
        } else {
            // Normal derivation: data = public_key || index
            hmac_input.extend_from_slice(&parent_public_key.serialize());
        }
        hmac_input.extend_from_slice(&index.to_be_bytes());

        let hmac_result = utils::hmac_sha512(&self.chain_code, &hmac_input);
        let (il, ir) = hmac_result.split_at(32);

        let private_key = tweak_private(&self.private_key, il, index)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(ExtendedPrivKey {
            depth: self.depth + 1,
            parent_fingerprint: fingerprint(&parent_public_key),
            child_number: index,
            chain_code,
            private_key,
            network: self.network,
        })
    }

    /// Derive a child key by walking a derivation path. An empty path
    /// returns the key unchanged.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedPrivKey, Error> {
        let mut key = self.clone();
        for &child_number in &path.components {
            key = key.derive_child(child_number)?;
        }
        Ok(key)
    }

    /// Get the corresponding extended public key
    pub fn to_extended_public_key(&self) -> ExtendedPubKey {
        let secp = Secp256k1::new();
        ExtendedPubKey {
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            public_key: PublicKey::from_secret_key(&secp, &self.private_key),
            network: self.network,
        }
    }

    /// Fingerprint of this key's public half
    pub fn fingerprint(&self) -> [u8; 4] {
        let secp = Secp256k1::new();
        fingerprint(&PublicKey::from_secret_key(&secp, &self.private_key))
    }
}

impl fmt::Display for ExtendedPrivKey {
    /// Serialize to the base58check extended key format
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut key_material = [0u8; 33];
        key_material[1..].copy_from_slice(&self.private_key[..]);
        f.write_str(&encode_extended(
            self.network.xprv_version(),
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
            &key_material,
        ))
    }
}

impl FromStr for ExtendedPrivKey {
    type Err = Error;

    fn from_str(xprv: &str) -> Result<Self, Self::Err> {
        let raw = decode_extended(xprv)?;

        let network = Network::from_xprv_version(raw.version).ok_or_else(|| {
            Error::InvalidExtendedKey("Unrecognized version bytes".to_string())
        })?;

        if raw.key_material[0] != 0 {
            return Err(Error::InvalidExtendedKey(
                "Invalid private key prefix".to_string(),
            ));
        }

        let private_key = SecretKey::from_slice(&raw.key_material[1..])
            .map_err(|_| Error::InvalidExtendedKey("Private key out of range".to_string()))?;

        Ok(ExtendedPrivKey {
            depth: raw.depth,
            parent_fingerprint: raw.parent_fingerprint,
            child_number: raw.child_number,
            chain_code: raw.chain_code,
            private_key,
            network,
        })
    }
}

/// Extended public key as defined in BIP-32
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPubKey {
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_number: u32,
    pub chain_code: [u8; 32],
    pub public_key: PublicKey,
    pub network: Network,
}

impl ExtendedPubKey {
    /// Derive a child key (CKDpub). Only normal indices are possible:
    /// hardened derivation feeds the parent private key into the HMAC.
    pub fn derive_child(&self, child_number: ChildNumber) -> Result<ExtendedPubKey, Error> {
        if child_number.is_hardened() {
            return Err(Error::HardenedDerivationRequiresPrivateKey);
        }

        let secp = Secp256k1::new();
        let index = child_number.to_u32();

        let mut hmac_input = Vec::with_capacity(37);
        hmac_input.extend_from_slice(&self.public_key.serialize());
        hmac_input.extend_from_slice(&index.to_be_bytes());

        let hmac_result = utils::hmac_sha512(&self.chain_code, &hmac_input);
        let (il, ir) = hmac_result.split_at(32);

        let public_key = tweak_public(&secp, &self.public_key, il, index)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(ExtendedPubKey {
            depth: self.depth + 1,
            parent_fingerprint: fingerprint(&self.public_key),
            child_number: index,
            chain_code,
            public_key,
            network: self.network,
        })
    }

    /// Derive a child key by walking a derivation path (normal indices only)
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedPubKey, Error> {
        let mut key = self.clone();
        for &child_number in &path.components {
            key = key.derive_child(child_number)?;
        }
        Ok(key)
    }

    /// Fingerprint of this public key
    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint(&self.public_key)
    }
}

impl fmt::Display for ExtendedPubKey {
    /// Serialize to the base58check extended key format
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&encode_extended(
            self.network.xpub_version(),
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
            &self.public_key.serialize(),
        ))
    }
}

impl FromStr for ExtendedPubKey {
    type Err = Error;

    fn from_str(xpub: &str) -> Result<Self, Self::Err> {
        let raw = decode_extended(xpub)?;

        let network = Network::from_xpub_version(raw.version).ok_or_else(|| {
            Error::InvalidExtendedKey("Unrecognized version bytes".to_string())
        })?;

        let public_key = PublicKey::from_slice(&raw.key_material)
            .map_err(|_| Error::InvalidExtendedKey("Invalid public key".to_string()))?;

        Ok(ExtendedPubKey {
            depth: raw.depth,
            parent_fingerprint: raw.parent_fingerprint,
            child_number: raw.child_number,
            chain_code: raw.chain_code,
            public_key,
            network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // secp256k1 group order n
    const CURVE_ORDER: [u8; 32] =
        hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");

    fn any_parent_key() -> SecretKey {
        SecretKey::from_slice(&[0x42; 32]).unwrap()
    }

    #[test]
    fn tweak_rejects_il_at_curve_order() {
        let err = tweak_private(&any_parent_key(), &CURVE_ORDER, 7).unwrap_err();
        assert!(matches!(err, Error::InvalidChildKey { index: 7 }));
    }

    #[test]
    fn tweak_rejects_il_above_curve_order() {
        let err = tweak_private(&any_parent_key(), &[0xff; 32], 9).unwrap_err();
        assert!(matches!(err, Error::InvalidChildKey { index: 9 }));
    }

    #[test]
    fn tweak_rejects_zero_il() {
        // IL = 0 would leave the child equal to its parent
        let err = tweak_private(&any_parent_key(), &[0u8; 32], 0).unwrap_err();
        assert!(matches!(err, Error::InvalidChildKey { index: 0 }));
    }

    #[test]
    fn tweak_public_rejects_invalid_il() {
        let secp = Secp256k1::new();
        let parent = PublicKey::from_secret_key(&secp, &any_parent_key());
        let err = tweak_public(&secp, &parent, &CURVE_ORDER, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidChildKey { index: 3 }));
    }

    #[test]
    fn parse_path_components() {
        let path: DerivationPath = "m/44'/60'/0'/0".parse().unwrap();
        assert_eq!(
            path.components,
            vec![
                ChildNumber::Hardened(44),
                ChildNumber::Hardened(60),
                ChildNumber::Hardened(0),
                ChildNumber::Normal(0),
            ]
        );
        assert_eq!(path.to_string(), "m/44'/60'/0'/0");
        assert!(!path.is_fully_normal());
    }

    #[test]
    fn parse_root_path() {
        let path: DerivationPath = "m".parse().unwrap();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "m");
    }

    #[test]
    fn parse_path_accepts_h_marker() {
        let path: DerivationPath = "m/0h/1".parse().unwrap();
        assert_eq!(
            path.components,
            vec![ChildNumber::Hardened(0), ChildNumber::Normal(1)]
        );
    }

    #[test]
    fn parse_path_rejects_out_of_range_index() {
        assert!("m/2147483648".parse::<DerivationPath>().is_err());
        assert!("m/2147483648'".parse::<DerivationPath>().is_err());
        assert!("44'/0'".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn empty_path_is_identity() {
        let master =
            ExtendedPrivKey::new_master(&[0x01; 32], Network::Mainnet).unwrap();
        let path: DerivationPath = "m".parse().unwrap();
        assert_eq!(master.derive_path(&path).unwrap(), master);
    }

    #[test]
    fn master_rejects_short_and_long_seeds() {
        assert!(matches!(
            ExtendedPrivKey::new_master(&[0u8; 8], Network::Mainnet),
            Err(Error::InvalidSeed(_))
        ));
        assert!(matches!(
            ExtendedPrivKey::new_master(&[0u8; 65], Network::Mainnet),
            Err(Error::InvalidSeed(_))
        ));
    }

    #[test]
    fn hardened_child_number_round_trips_marker() {
        let hardened = ChildNumber::Hardened(44);
        assert_eq!(hardened.to_u32(), HARDENED_OFFSET + 44);
        assert!(hardened.is_hardened());
        assert_eq!(hardened.to_string(), "44'");
        assert_eq!("44'".parse::<ChildNumber>().unwrap(), hardened);
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        // Valid checksum framing around a payload that is not 78 bytes
        let short = utils::base58check_encode(&[0u8; 40]);
        assert!(matches!(
            short.parse::<ExtendedPrivKey>(),
            Err(Error::InvalidExtendedKey(_))
        ));
    }

    #[test]
    fn decode_rejects_mismatched_version() {
        let master =
            ExtendedPrivKey::new_master(&[0x02; 32], Network::Mainnet).unwrap();
        let xpub = master.to_extended_public_key().to_string();
        // An xpub is not decodable as a private key
        assert!(matches!(
            xpub.parse::<ExtendedPrivKey>(),
            Err(Error::InvalidExtendedKey(_))
        ));
    }
}
