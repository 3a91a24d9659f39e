// SPDX-License-Identifier: AGPL-3.0-only
//! # Land token contract
//!
//! Capped-supply collectible token. Constructed with
//! `(name, symbol, maximum_supply, contract_uri, token_uri,
//! proxy_registry_address)`; the deployer becomes the owner.
//!
//! ## Exported methods
//! | Method                       | Args                | Access        |
//! |------------------------------|---------------------|---------------|
//! | `name`                       | (none)              | view          |
//! | `symbol`                     | (none)              | view          |
//! | `maximum_supply`             | (none)              | view          |
//! | `contract_uri`               | (none)              | view          |
//! | `token_uri`                  | id                  | view          |
//! | `proxy_registry_address`     | (none)              | view          |
//! | `logic_contract_address`     | (none)              | view          |
//! | `total_supply`               | (none)              | view          |
//! | `owner_of`                   | id                  | view          |
//! | `set_contract_uri`           | uri                 | owner         |
//! | `set_token_uri`              | uri                 | owner         |
//! | `set_logic_contract_address` | address             | owner         |
//!
//! Mint and burn are not dispatchable: only the linked sale logic
//! contract reaches them, through the chain executor.

use crate::{arg, parse_u64};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandToken {
    owner: String,
    name: String,
    symbol: String,
    maximum_supply: u64,
    contract_uri: String,
    /// One collection-wide URI shared by every token id
    token_uri: String,
    proxy_registry_address: String,
    logic_contract_address: Option<String>,
    /// token id → holder; ids are sequential from 1, burn removes the
    /// highest id, so the map keys are always 1..=len
    owners: BTreeMap<u64, String>,
}

impl LandToken {
    pub fn new(
        owner: &str,
        name: &str,
        symbol: &str,
        maximum_supply: u64,
        contract_uri: &str,
        token_uri: &str,
        proxy_registry_address: &str,
    ) -> Result<Self, String> {
        if name.is_empty() || symbol.is_empty() {
            return Err("token name and symbol must be set".to_string());
        }
        if maximum_supply == 0 {
            return Err("maximum supply must be positive".to_string());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            maximum_supply,
            contract_uri: contract_uri.to_string(),
            token_uri: token_uri.to_string(),
            proxy_registry_address: proxy_registry_address.to_string(),
            logic_contract_address: None,
            owners: BTreeMap::new(),
        })
    }

    /// Construct from the six deploy args, in constructor order.
    pub fn from_args(owner: &str, args: &[String]) -> Result<Self, String> {
        if args.len() != 6 {
            return Err(format!(
                "land constructor takes 6 args (name, symbol, maximum_supply, \
                 contract_uri, token_uri, proxy_registry_address), got {}",
                args.len()
            ));
        }
        let maximum_supply = parse_u64(&args[2])?;
        Self::new(
            owner, &args[0], &args[1], maximum_supply, &args[3], &args[4], &args[5],
        )
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn maximum_supply(&self) -> u64 {
        self.maximum_supply
    }

    pub fn total_supply(&self) -> u64 {
        self.owners.len() as u64
    }

    pub fn logic_contract_address(&self) -> Option<&str> {
        self.logic_contract_address.as_deref()
    }

    pub fn owner_of(&self, token_id: u64) -> Result<&str, String> {
        self.owners
            .get(&token_id)
            .map(|s| s.as_str())
            .ok_or_else(|| format!("token {} does not exist", token_id))
    }

    pub fn token_uri(&self, token_id: u64) -> Result<&str, String> {
        if token_id > self.maximum_supply {
            return Err(format!(
                "token id {} exceeds the maximum supply {}",
                token_id, self.maximum_supply
            ));
        }
        Ok(&self.token_uri)
    }

    fn require_owner(&self, caller: &str) -> Result<(), String> {
        if caller != self.owner {
            return Err("caller is not the contract owner".to_string());
        }
        Ok(())
    }

    fn require_logic(&self, caller: &str) -> Result<(), String> {
        match &self.logic_contract_address {
            Some(logic) if caller == logic => Ok(()),
            _ => Err("caller is not the sale logic contract".to_string()),
        }
    }

    pub fn set_contract_uri(&mut self, caller: &str, uri: &str) -> Result<(), String> {
        self.require_owner(caller)?;
        self.contract_uri = uri.to_string();
        Ok(())
    }

    pub fn set_token_uri(&mut self, caller: &str, uri: &str) -> Result<(), String> {
        self.require_owner(caller)?;
        self.token_uri = uri.to_string();
        Ok(())
    }

    pub fn set_logic_contract_address(&mut self, caller: &str, address: &str) -> Result<(), String> {
        self.require_owner(caller)?;
        if address.is_empty() {
            return Err("logic contract address must be set".to_string());
        }
        self.logic_contract_address = Some(address.to_string());
        Ok(())
    }

    /// True when `count` more tokens fit under the supply cap.
    pub fn can_mint(&self, count: u64) -> bool {
        self.total_supply() + count <= self.maximum_supply
    }

    /// Mint the next token id to `to`. Only the linked sale logic contract
    /// may mint.
    pub fn mint(&mut self, caller: &str, to: &str) -> Result<u64, String> {
        self.require_logic(caller)?;
        if !self.can_mint(1) {
            return Err(format!(
                "maximum supply of {} reached",
                self.maximum_supply
            ));
        }
        let token_id = self.total_supply() + 1;
        self.owners.insert(token_id, to.to_string());
        Ok(token_id)
    }

    /// Burn the most recently minted token. Only the linked sale logic
    /// contract may burn.
    pub fn burn_last(&mut self, caller: &str) -> Result<u64, String> {
        self.require_logic(caller)?;
        let last_id = self.total_supply();
        if last_id == 0 {
            return Err("no tokens minted".to_string());
        }
        self.owners.remove(&last_id);
        Ok(last_id)
    }

    /// Read-only method dispatch.
    pub fn view(&self, method: &str, args: &[String]) -> Result<Value, String> {
        match method {
            "name" => Ok(json!(self.name)),
            "symbol" => Ok(json!(self.symbol)),
            "maximum_supply" => Ok(json!(self.maximum_supply)),
            "contract_uri" => Ok(json!(self.contract_uri)),
            "token_uri" => {
                let id = parse_u64(arg(args, 0, "token_id")?)?;
                Ok(json!(self.token_uri(id)?))
            }
            "proxy_registry_address" => Ok(json!(self.proxy_registry_address)),
            "logic_contract_address" => Ok(json!(self.logic_contract_address)),
            "total_supply" => Ok(json!(self.total_supply())),
            "owner_of" => {
                let id = parse_u64(arg(args, 0, "token_id")?)?;
                Ok(json!(self.owner_of(id)?))
            }
            other => Err(format!("unknown land view method '{}'", other)),
        }
    }

    /// State-changing method dispatch (owner-gated setters).
    pub fn execute(&mut self, caller: &str, method: &str, args: &[String]) -> Result<Value, String> {
        match method {
            "set_contract_uri" => {
                self.set_contract_uri(caller, arg(args, 0, "uri")?)?;
                Ok(json!({"contract_uri": self.contract_uri}))
            }
            "set_token_uri" => {
                self.set_token_uri(caller, arg(args, 0, "uri")?)?;
                Ok(json!({"token_uri": self.token_uri}))
            }
            "set_logic_contract_address" => {
                self.set_logic_contract_address(caller, arg(args, 0, "address")?)?;
                Ok(json!({"logic_contract_address": self.logic_contract_address}))
            }
            other => Err(format!("unknown land method '{}'", other)),
        }
    }

    /// Contract summary for the node's registry routes.
    pub fn summary(&self, address: &str) -> Value {
        json!({
            "address": address,
            "kind": "land",
            "name": self.name,
            "symbol": self.symbol,
            "maximum_supply": self.maximum_supply,
            "total_supply": self.total_supply(),
            "contract_uri": self.contract_uri,
            "token_uri": self.token_uri,
            "proxy_registry_address": self.proxy_registry_address,
            "logic_contract_address": self.logic_contract_address,
            "owner": self.owner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> LandToken {
        LandToken::new(
            "LNDowner",
            "Land DAO",
            "LANDDAO",
            4,
            "ipfs://contract",
            "ipfs://token",
            "0xa5409ec958c83c3f309868babaca7c86dcb077c1",
        )
        .unwrap()
    }

    #[test]
    fn test_constructor_validation() {
        assert!(LandToken::new("o", "", "S", 1, "c", "t", "p").is_err());
        assert!(LandToken::new("o", "N", "S", 0, "c", "t", "p").is_err());
        let args: Vec<String> = ["N", "S", "nope", "c", "t", "p"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(LandToken::from_args("o", &args).is_err());
    }

    #[test]
    fn test_owner_gate_on_setters() {
        let mut land = token();
        assert!(land.set_contract_uri("LNDowner", "ipfs://new").is_ok());
        assert_eq!(
            land.set_contract_uri("LNDother", "ipfs://evil").unwrap_err(),
            "caller is not the contract owner"
        );
        assert!(land.set_token_uri("LNDother", "ipfs://evil").is_err());
        assert!(land
            .set_logic_contract_address("LNDother", "LNDConx")
            .is_err());
    }

    #[test]
    fn test_mint_requires_logic_contract() {
        let mut land = token();
        // Not linked yet: nobody can mint, not even the owner
        assert!(land.mint("LNDowner", "LNDbuyer").is_err());

        land.set_logic_contract_address("LNDowner", "LNDConSale").unwrap();
        assert!(land.mint("LNDowner", "LNDbuyer").is_err());
        assert_eq!(land.mint("LNDConSale", "LNDbuyer").unwrap(), 1);
        assert_eq!(land.mint("LNDConSale", "LNDbuyer").unwrap(), 2);
        assert_eq!(land.total_supply(), 2);
        assert_eq!(land.owner_of(2).unwrap(), "LNDbuyer");
    }

    #[test]
    fn test_supply_cap() {
        let mut land = token();
        land.set_logic_contract_address("LNDowner", "LNDConSale").unwrap();
        for _ in 0..4 {
            land.mint("LNDConSale", "LNDbuyer").unwrap();
        }
        assert!(!land.can_mint(1));
        assert!(land.mint("LNDConSale", "LNDbuyer").is_err());
    }

    #[test]
    fn test_burn_last() {
        let mut land = token();
        land.set_logic_contract_address("LNDowner", "LNDConSale").unwrap();
        land.mint("LNDConSale", "LNDa").unwrap();
        land.mint("LNDConSale", "LNDb").unwrap();

        assert!(land.burn_last("LNDa").is_err());
        assert_eq!(land.burn_last("LNDConSale").unwrap(), 2);
        assert_eq!(land.total_supply(), 1);
        assert!(land.owner_of(2).is_err());
        // Next mint reuses the freed id
        assert_eq!(land.mint("LNDConSale", "LNDc").unwrap(), 2);
    }

    #[test]
    fn test_token_uri_is_collection_wide() {
        let land = token();
        assert_eq!(land.token_uri(0).unwrap(), "ipfs://token");
        assert_eq!(land.token_uri(4).unwrap(), "ipfs://token");
        assert!(land.token_uri(5).is_err());
    }

    #[test]
    fn test_view_dispatch() {
        let land = token();
        assert_eq!(land.view("name", &[]).unwrap(), json!("Land DAO"));
        assert_eq!(land.view("total_supply", &[]).unwrap(), json!(0));
        assert!(land.view("owner_of", &["1".to_string()]).is_err());
        assert!(land.view("no_such_method", &[]).is_err());
    }
}
