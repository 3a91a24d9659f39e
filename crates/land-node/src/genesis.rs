// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LAND DAO DEV NODE - GENESIS MODULE
//
// Seeds the dev chain with deterministic accounts derived from the
// configured mnemonic. Same phrase, same accounts, every boot — any
// client deriving from the phrase controls them.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use land_contracts::Chain;
use land_core::config::ChainConfig;
use land_crypto::{CryptoError, KeyPair};

/// One derived dev account: keypair plus its LND address.
pub struct DevAccount {
    pub index: u32,
    pub address: String,
    pub keypair: KeyPair,
}

/// Derive the configured number of dev accounts from the chain mnemonic.
pub fn derive_accounts(config: &ChainConfig) -> Result<Vec<DevAccount>, CryptoError> {
    let keypairs = land_crypto::derive_dev_accounts(&config.mnemonic, config.total_accounts)?;
    Ok(keypairs
        .into_iter()
        .enumerate()
        .map(|(i, keypair)| DevAccount {
            index: i as u32,
            address: land_crypto::public_key_to_address(&keypair.public_key),
            keypair,
        })
        .collect())
}

/// Credit every dev account with the configured starting balance.
pub fn seed_chain(chain: &mut Chain, accounts: &[DevAccount]) {
    let balance = chain.config.default_balance_wei();
    for account in accounts {
        chain.seed_account(&account.address, balance);
    }
}

/// Startup banner advertising the available accounts, the way the
/// original chain emulator printed its unlocked account list.
pub fn print_banner(config: &ChainConfig, accounts: &[DevAccount]) {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║   LAND DAO DEV CHAIN                                     ║");
    println!("║   Single-node, in-memory, instant finality               ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
    println!("Network id:   {}", config.network_id);
    println!("Gas limit:    {}", config.gas_limit);
    println!("Gas price:    {} wei", config.gas_price_wei);
    println!();
    println!("Available accounts ({} ether each):", config.default_balance_ether);
    for account in accounts {
        println!("  ({}) {}", account.index, account.address);
    }
    println!();
    println!("Mnemonic: {}", config.mnemonic);
}
