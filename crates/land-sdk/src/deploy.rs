// SPDX-License-Identifier: AGPL-3.0-only
//! Deployment sequence for the sale system.
//!
//! Mirrors the original migration: deploy the sale first, then the
//! token with its six constructor arguments (the proxy registry picked
//! by target network), then link the two — the sale learns the token
//! address and the token learns which contract may mint and burn.

use crate::{LandHandle, RpcClient, SaleHandle, SdkError, Signer};
use land_core::config::{Network, SaleConfig};
use land_core::ContractName;

/// Addresses of a completed deployment, sale first (deploy order).
#[derive(Debug, Clone)]
pub struct Deployment {
    pub sale_address: String,
    pub land_address: String,
}

impl Deployment {
    pub fn handles(&self, client: &RpcClient) -> (LandHandle, SaleHandle) {
        (
            LandHandle::new(client.clone(), self.land_address.clone()),
            SaleHandle::new(client.clone(), self.sale_address.clone()),
        )
    }
}

/// Deploy both contracts and link them. The deployer becomes the owner
/// of both.
pub async fn deploy_and_link(
    client: &RpcClient,
    deployer: &Signer,
    config: &SaleConfig,
    network: Network,
) -> Result<Deployment, SdkError> {
    let sale_address = client
        .deploy(deployer, ContractName::LandSale, vec![])
        .await?;

    let proxy_registry = network.proxy_registry_address(config);
    let land_address = client
        .deploy(
            deployer,
            ContractName::Land,
            vec![
                config.token_name.clone(),
                config.token_symbol.clone(),
                config.token_max_supply.to_string(),
                config.token_contract_uri.clone(),
                config.token_uri.clone(),
                proxy_registry,
            ],
        )
        .await?;

    client
        .call(deployer, &sale_address, "set_token_contract", &[&land_address])
        .await?;
    client
        .call(
            deployer,
            &land_address,
            "set_logic_contract_address",
            &[&sale_address],
        )
        .await?;

    Ok(Deployment {
        sale_address,
        land_address,
    })
}
