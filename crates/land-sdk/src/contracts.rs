// SPDX-License-Identifier: AGPL-3.0-only
//! Typed handles for the two deployed contracts.
//!
//! A handle binds the RPC client to one contract address and exposes
//! its methods with real Rust types, mirroring the contract-handle
//! objects the original test harness loaded into its shared context.

use crate::{parse_wei, RpcClient, SdkError, Signer};
use land_core::Receipt;
use serde_json::Value;

/// An address's purchase allowance as reported by the sale contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceView {
    pub count: u64,
    pub price: u128,
}

fn expect_str(value: Value, what: &str) -> Result<String, SdkError> {
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| SdkError::Decode(format!("expected string for {}", what)))
}

fn expect_u64(value: Value, what: &str) -> Result<u64, SdkError> {
    value
        .as_u64()
        .ok_or_else(|| SdkError::Decode(format!("expected number for {}", what)))
}

fn optional_str(value: Value) -> Option<String> {
    value.as_str().map(|s| s.to_string())
}

// ─────────────────────────────────────────────────────────────────
// LAND TOKEN HANDLE
// ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LandHandle {
    client: RpcClient,
    pub address: String,
}

impl LandHandle {
    pub fn new(client: RpcClient, address: String) -> Self {
        Self { client, address }
    }

    async fn view(&self, method: &str, args: &[&str]) -> Result<Value, SdkError> {
        self.client.view(&self.address, method, args).await
    }

    pub async fn name(&self) -> Result<String, SdkError> {
        expect_str(self.view("name", &[]).await?, "name")
    }

    pub async fn symbol(&self) -> Result<String, SdkError> {
        expect_str(self.view("symbol", &[]).await?, "symbol")
    }

    pub async fn maximum_supply(&self) -> Result<u64, SdkError> {
        expect_u64(self.view("maximum_supply", &[]).await?, "maximum_supply")
    }

    pub async fn contract_uri(&self) -> Result<String, SdkError> {
        expect_str(self.view("contract_uri", &[]).await?, "contract_uri")
    }

    pub async fn token_uri(&self, token_id: u64) -> Result<String, SdkError> {
        expect_str(
            self.view("token_uri", &[&token_id.to_string()]).await?,
            "token_uri",
        )
    }

    pub async fn proxy_registry_address(&self) -> Result<String, SdkError> {
        expect_str(
            self.view("proxy_registry_address", &[]).await?,
            "proxy_registry_address",
        )
    }

    pub async fn logic_contract_address(&self) -> Result<Option<String>, SdkError> {
        Ok(optional_str(self.view("logic_contract_address", &[]).await?))
    }

    pub async fn total_supply(&self) -> Result<u64, SdkError> {
        expect_u64(self.view("total_supply", &[]).await?, "total_supply")
    }

    pub async fn owner_of(&self, token_id: u64) -> Result<String, SdkError> {
        expect_str(
            self.view("owner_of", &[&token_id.to_string()]).await?,
            "owner_of",
        )
    }

    pub async fn set_contract_uri(&self, signer: &Signer, uri: &str) -> Result<Receipt, SdkError> {
        self.client
            .call(signer, &self.address, "set_contract_uri", &[uri])
            .await
    }

    pub async fn set_token_uri(&self, signer: &Signer, uri: &str) -> Result<Receipt, SdkError> {
        self.client
            .call(signer, &self.address, "set_token_uri", &[uri])
            .await
    }

    pub async fn set_logic_contract_address(
        &self,
        signer: &Signer,
        address: &str,
    ) -> Result<Receipt, SdkError> {
        self.client
            .call(signer, &self.address, "set_logic_contract_address", &[address])
            .await
    }
}

// ─────────────────────────────────────────────────────────────────
// SALE HANDLE
// ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SaleHandle {
    client: RpcClient,
    pub address: String,
}

impl SaleHandle {
    pub fn new(client: RpcClient, address: String) -> Self {
        Self { client, address }
    }

    async fn view(&self, method: &str, args: &[&str]) -> Result<Value, SdkError> {
        self.client.view(&self.address, method, args).await
    }

    pub async fn token_contract(&self) -> Result<Option<String>, SdkError> {
        Ok(optional_str(self.view("token_contract", &[]).await?))
    }

    pub async fn funds_address(&self, index: usize) -> Result<Option<String>, SdkError> {
        Ok(optional_str(
            self.view("funds_addresses", &[&index.to_string()]).await?,
        ))
    }

    pub async fn funds_unlock_timestamp(&self) -> Result<u64, SdkError> {
        expect_u64(
            self.view("funds_unlock_timestamp", &[]).await?,
            "funds_unlock_timestamp",
        )
    }

    pub async fn allowance(&self, address: &str) -> Result<AllowanceView, SdkError> {
        let value = self.view("allowance", &[address]).await?;
        Ok(AllowanceView {
            count: expect_u64(value["count"].clone(), "allowance count")?,
            price: parse_wei(&value["price"])?,
        })
    }

    pub async fn reserve_funds(&self) -> Result<u128, SdkError> {
        parse_wei(&self.view("reserve_funds", &[]).await?)
    }

    pub async fn unlocked_funds(&self) -> Result<u128, SdkError> {
        parse_wei(&self.view("unlocked_funds", &[]).await?)
    }

    pub async fn locked_funds(&self) -> Result<u128, SdkError> {
        parse_wei(&self.view("locked_funds", &[]).await?)
    }

    pub async fn set_token_contract(
        &self,
        signer: &Signer,
        address: &str,
    ) -> Result<Receipt, SdkError> {
        self.client
            .call(signer, &self.address, "set_token_contract", &[address])
            .await
    }

    pub async fn set_funds_address(
        &self,
        signer: &Signer,
        index: usize,
        address: &str,
    ) -> Result<Receipt, SdkError> {
        self.client
            .call(
                signer,
                &self.address,
                "set_funds_address",
                &[&index.to_string(), address],
            )
            .await
    }

    pub async fn set_funds_unlock_timestamp(
        &self,
        signer: &Signer,
        timestamp: u64,
    ) -> Result<Receipt, SdkError> {
        self.client
            .call(
                signer,
                &self.address,
                "set_funds_unlock_timestamp",
                &[&timestamp.to_string()],
            )
            .await
    }

    pub async fn set_allowance(
        &self,
        signer: &Signer,
        address: &str,
        count: u64,
        price: u128,
    ) -> Result<Receipt, SdkError> {
        self.client
            .call(
                signer,
                &self.address,
                "set_allowance",
                &[address, &count.to_string(), &price.to_string()],
            )
            .await
    }

    /// Batch allowance update; the three lists must be equal length.
    pub async fn batch_set_allowances(
        &self,
        signer: &Signer,
        addresses: &[&str],
        counts: &[u64],
        prices: &[u128],
    ) -> Result<Receipt, SdkError> {
        let addresses = addresses.join(",");
        let counts = counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let prices = prices
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.client
            .call(
                signer,
                &self.address,
                "batch_set_allowances",
                &[&addresses, &counts, &prices],
            )
            .await
    }

    /// Purchase by paying the sale address — the payable-default path.
    pub async fn purchase(&self, signer: &Signer, value_wei: u128) -> Result<Receipt, SdkError> {
        self.client.transfer(signer, &self.address, value_wei).await
    }

    pub async fn withdraw(&self, signer: &Signer) -> Result<Receipt, SdkError> {
        self.client
            .call(signer, &self.address, "withdraw", &[])
            .await
    }

    pub async fn refund(&self, signer: &Signer) -> Result<Receipt, SdkError> {
        self.client.call(signer, &self.address, "refund", &[]).await
    }
}
