use crate::address;
use crate::bip32::ExtendedPrivKey;
use secp256k1::{PublicKey, Secp256k1};

/// Materialized account record: the user-facing view of one derived key.
/// Plain immutable value, no lifecycle beyond construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    /// EIP-55 checksummed address
    pub address: String,
    /// Compressed public key, 33 bytes hex
    pub public_key: String,
    /// Private key scalar, 32 bytes hex
    pub private_key: String,
}

impl Wallet {
    /// Materialize a wallet from a derived key node. The node type carries
    /// its private key, so the public key and address always follow from it.
    pub fn from_extended_key(key: &ExtendedPrivKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &key.private_key);

        Wallet {
            address: address::from_public_key(&public_key),
            public_key: hex::encode(public_key.serialize()),
            private_key: hex::encode(key.private_key.secret_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bip32::Network;

    #[test]
    fn wallet_fields_are_consistent() {
        let master = ExtendedPrivKey::new_master(&[0x5a; 32], Network::Mainnet).unwrap();
        let wallet = Wallet::from_extended_key(&master);

        assert_eq!(wallet.private_key, hex::encode(master.private_key.secret_bytes()));
        assert_eq!(wallet.public_key.len(), 66);
        assert_eq!(wallet.private_key.len(), 64);
        assert!(wallet.address.starts_with("0x"));

        // Public key must be recomputable from the private key alone
        let secp = Secp256k1::new();
        let recovered = PublicKey::from_secret_key(&secp, &master.private_key);
        assert_eq!(wallet.public_key, hex::encode(recovered.serialize()));
    }
}
