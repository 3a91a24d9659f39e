// ============================================================================
// E2E TEST HARNESS — LAND DAO SALE
// ============================================================================
//
// Per-test fixture: boots a fresh in-process dev node on an ephemeral
// port, derives the named dev accounts from the local mnemonic, runs
// the full deployment sequence, and hands back typed contract handles.
// Every test gets its own chain — no shared mutable context between
// tests, no ordering dependencies.
//
// Named accounts (derivation order, same as the node's genesis):
//   (0) primary sender    — deployer and owner of both contracts
//   (1) secondary sender  — the unprivileged caller rejections use
//   (2) treasury account  — funds slot 0 (5% reserve)
//   (3) founder account   — funds slot 1 (quarter of the unlocked pool)
//   (4..6)                — extra whitelist targets for batch tests
// ============================================================================

#![allow(dead_code)]

use land_contracts::Chain;
use land_core::config::{ChainConfig, Network, SaleConfig, LOCAL_MNEMONIC};
use land_node::{genesis, NodeState};
use land_sdk::{deploy_and_link, LandHandle, RpcClient, SaleHandle, Signer, Wallet};

pub struct TestContext {
    pub client: RpcClient,
    pub wallet: Wallet,
    /// Dev account addresses in derivation order
    pub accounts: Vec<String>,
    pub land: LandHandle,
    pub sale: SaleHandle,
    pub config: SaleConfig,
}

impl TestContext {
    /// Fresh chain, node, accounts, and deployed/linked contracts.
    pub async fn bootstrap() -> Self {
        let chain_config = ChainConfig::default();
        let dev_accounts =
            genesis::derive_accounts(&chain_config).expect("dev account derivation failed");
        let mut chain = Chain::new(chain_config.clone());
        genesis::seed_chain(&mut chain, &dev_accounts);

        let accounts: Vec<String> = dev_accounts.iter().map(|a| a.address.clone()).collect();
        let (addr, _server) = land_node::spawn(NodeState::new(chain, accounts.clone()));
        let client = RpcClient::new(&format!("http://{}", addr));

        let wallet = Wallet::from_mnemonic(LOCAL_MNEMONIC, chain_config.total_accounts)
            .expect("wallet derivation failed");
        let config = SaleConfig::default();
        let deployment = deploy_and_link(&client, wallet.signer(0), &config, Network::Local)
            .await
            .expect("deployment failed");
        let (land, sale) = deployment.handles(&client);

        Self {
            client,
            wallet,
            accounts,
            land,
            sale,
            config,
        }
    }

    pub fn primary_sender(&self) -> &Signer {
        self.wallet.signer(0)
    }

    pub fn secondary_sender(&self) -> &Signer {
        self.wallet.signer(1)
    }

    pub fn treasury_account(&self) -> &Signer {
        self.wallet.signer(2)
    }

    pub fn founder_account(&self) -> &Signer {
        self.wallet.signer(3)
    }
}

/// Current unix time in seconds.
pub fn now_ts() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
