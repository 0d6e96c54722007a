use anyhow::Result;
use hdwallet::{HdWallet, MnemonicType};

const DEFAULT_PATH: &str = "m/44'/60'/0'/0";

fn main() -> Result<()> {
    // Example 1: Generate a fresh wallet and derive its first accounts
    println!("Example 1: Generate new mnemonic and wallet");
    println!("-------------------------------------------");

    let session = HdWallet::generate(DEFAULT_PATH, MnemonicType::Words12)?;

    println!("Mnemonic: {}", session.mnemonic_phrase()?);
    println!("Seed: {}", session.seed_hex()?);
    println!("Master xprv: {}", session.master_xprv());
    println!("Root child xpub: {}", session.root_xpub());

    for index in 0..3 {
        let wallet = session.wallet_at(index)?;
        println!("Account {}: {}", index, wallet.address);
    }

    // Example 2: Re-enter the tree from an exported extended key
    println!("\nExample 2: Import an extended private key");
    println!("-------------------------------------------");

    let exported = session.root_xprv();
    let imported = HdWallet::from_extended_private_key("m", &exported)?;

    let wallet = imported.wallet_at(0)?;
    println!("Re-imported account 0: {}", wallet.address);
    println!("Public key: {}", wallet.public_key);

    Ok(())
}
