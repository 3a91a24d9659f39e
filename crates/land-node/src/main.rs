// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LAND DAO DEV NODE - ENTRY POINT
//
// Boots the local chain emulator: derives the dev accounts from the
// configured mnemonic, seeds their balances, and serves the REST API.
//
// Usage:
//   land-node [config.toml]       (or LAND_NODE_CONFIG=path land-node)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use land_contracts::Chain;
use land_core::config::ChainConfig;
use land_node::{genesis, NodeState};
use std::net::{IpAddr, SocketAddr};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LAND_NODE_CONFIG").ok());

    let config = match config_path {
        Some(path) => match ChainConfig::load(&path) {
            Ok(config) => {
                println!("📄 Loaded chain config from {}", path);
                config
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        },
        None => ChainConfig::default(),
    };

    let accounts = match genesis::derive_accounts(&config) {
        Ok(accounts) => accounts,
        Err(e) => {
            eprintln!("❌ Failed to derive dev accounts: {}", e);
            std::process::exit(1);
        }
    };

    let mut chain = Chain::new(config.clone());
    genesis::seed_chain(&mut chain, &accounts);
    genesis::print_banner(&config, &accounts);

    let host: IpAddr = match config.host.parse() {
        Ok(host) => host,
        Err(_) => {
            eprintln!("❌ Invalid host address '{}'", config.host);
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::new(host, config.port);
    println!();
    println!("🌐 RPC listening on http://{}", addr);

    let addresses = accounts.iter().map(|a| a.address.clone()).collect();
    land_node::run(NodeState::new(chain, addresses), addr).await;
}
