use crate::utils;
use secp256k1::PublicKey;

/// Ethereum address of a public key: Keccak-256 over the 64-byte
/// uncompressed point body, last 20 bytes, EIP-55 mixed-case hex.
pub fn from_public_key(public_key: &PublicKey) -> String {
    let uncompressed = public_key.serialize_uncompressed();
    // Skip the 0x04 point marker
    let hash = utils::keccak256(&uncompressed[1..]);
    checksum_encode(&hash[12..])
}

/// EIP-55 checksum encoding of a 20-byte address
fn checksum_encode(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let digest = utils::keccak256(lower.as_bytes());

    let mut encoded = String::with_capacity(2 + lower.len());
    encoded.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            digest[i / 2] >> 4
        } else {
            digest[i / 2] & 0x0f
        };
        if nibble >= 8 {
            encoded.push(c.to_ascii_uppercase());
        } else {
            encoded.push(c);
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::{Secp256k1, SecretKey};

    fn address_of(private_key_hex: &str) -> String {
        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(&hex::decode(private_key_hex).unwrap()).unwrap();
        from_public_key(&PublicKey::from_secret_key(&secp, &secret))
    }

    #[test]
    fn known_key_to_address() {
        assert_eq!(
            address_of("501c797c4b1fdfa88fb7efdf7c9871b8e0f46dbc44259e3e270e0d4c938165f5"),
            "0xb611C31e4284BF7A7daD3296e62880F14b3b15DD"
        );
    }

    #[test]
    fn anvil_account_zero() {
        assert_eq!(
            address_of("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn checksum_mixes_case() {
        // EIP-55 reference vector
        assert_eq!(
            checksum_encode(&hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap()),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn all_addresses_are_42_chars() {
        let addr = address_of("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
        assert_eq!(addr.len(), 42);
        assert!(addr.starts_with("0x"));
    }
}
