// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LAND DAO - CONFIGURATION MODULE
//
// Token metadata, deployment targets, and dev-chain parameters.
// Defaults are the canonical Land DAO sale values; both structs load
// from TOML for overrides.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::{WEI_PER_ETHER, WEI_PER_GWEI};
use serde::{Deserialize, Serialize};

/// Dev mnemonic seeding the local chain accounts.
/// PUBLIC — a well-known test phrase with zero real-world value.
pub const LOCAL_MNEMONIC: &str =
    "concert load couple harbor equip island argue ramp clarify fence smart topic";

/// Default local RPC endpoint served by land-node
pub const LOCAL_ENDPOINT: &str = "http://localhost:8545";

pub const TOKEN_NAME: &str = "Land DAO";
pub const TOKEN_SYMBOL: &str = "LANDDAO";
pub const TOKEN_MAX_SUPPLY: u64 = 256;
pub const TOKEN_CONTRACT_URI: &str =
    "https://gateway.pinata.cloud/ipfs/QmPEqr611KnXudqAUaHWDTLR9WBkDgsXYCNz7U9CNBrAe6";
pub const TOKEN_URI: &str =
    "https://gateway.pinata.cloud/ipfs/QmYrbHioYHLGQFe3GDpq2mdZMW3ohwrqxQtUAzj2yGnKWB";

/// Marketplace operator registry on the test network
pub const TESTNET_PROXY_REGISTRY_ADDRESS: &str = "0xf57b2c51ded3a29e6891aba85459d600256cf317";
/// Marketplace operator registry on mainnet
pub const MAINNET_PROXY_REGISTRY_ADDRESS: &str = "0xa5409ec958c83c3f309868babaca7c86dcb077c1";

// Dev chain defaults (the local emulator bootstrap parameters)
pub const DEFAULT_NETWORK_ID: u64 = 3333;
pub const DEFAULT_TOTAL_ACCOUNTS: u32 = 7;
pub const DEFAULT_GAS_LIMIT: u64 = 20_000_000;
/// 100 gwei
pub const DEFAULT_GAS_PRICE_WEI: u128 = 100 * WEI_PER_GWEI;
pub const DEFAULT_BALANCE_ETHER: u128 = 200_000_000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8545;

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config TOML: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Deployment target network, selecting the marketplace proxy registry
/// the token is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Local,
    Testnet,
    Mainnet,
}

impl Network {
    /// Local deployments use the mainnet registry value as a placeholder,
    /// matching the original local migration behavior.
    pub fn proxy_registry_address(self, config: &SaleConfig) -> String {
        match self {
            Network::Testnet => config.testnet_proxy_registry_address.clone(),
            Network::Local | Network::Mainnet => config.mainnet_proxy_registry_address.clone(),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Network::Local),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!(
                "Unknown network '{}' (expected local, testnet, or mainnet)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Network::Local => write!(f, "local"),
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

/// Token-sale deployment configuration: the Land constructor arguments
/// plus the per-network proxy registry addresses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SaleConfig {
    pub token_name: String,
    pub token_symbol: String,
    pub token_max_supply: u64,
    pub token_contract_uri: String,
    pub token_uri: String,
    pub testnet_proxy_registry_address: String,
    pub mainnet_proxy_registry_address: String,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            token_name: TOKEN_NAME.to_string(),
            token_symbol: TOKEN_SYMBOL.to_string(),
            token_max_supply: TOKEN_MAX_SUPPLY,
            token_contract_uri: TOKEN_CONTRACT_URI.to_string(),
            token_uri: TOKEN_URI.to_string(),
            testnet_proxy_registry_address: TESTNET_PROXY_REGISTRY_ADDRESS.to_string(),
            mainnet_proxy_registry_address: MAINNET_PROXY_REGISTRY_ADDRESS.to_string(),
        }
    }
}

impl SaleConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Local dev-chain bootstrap parameters (the chain emulator's knobs).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    pub network_id: u64,
    pub total_accounts: u32,
    pub gas_limit: u64,
    pub gas_price_wei: u128,
    /// Starting balance per dev account, in ether
    pub default_balance_ether: u128,
    pub mnemonic: String,
    pub host: String,
    pub port: u16,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID,
            total_accounts: DEFAULT_TOTAL_ACCOUNTS,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price_wei: DEFAULT_GAS_PRICE_WEI,
            default_balance_ether: DEFAULT_BALANCE_ETHER,
            mnemonic: LOCAL_MNEMONIC.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ChainConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Starting balance per dev account, in wei
    pub fn default_balance_wei(&self) -> u128 {
        self.default_balance_ether * WEI_PER_ETHER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_sale_constants() {
        let config = SaleConfig::default();
        assert_eq!(config.token_name, "Land DAO");
        assert_eq!(config.token_symbol, "LANDDAO");
        assert_eq!(config.token_max_supply, 256);
    }

    #[test]
    fn test_network_selects_proxy_registry() {
        let config = SaleConfig::default();
        assert_eq!(
            Network::Testnet.proxy_registry_address(&config),
            TESTNET_PROXY_REGISTRY_ADDRESS
        );
        assert_eq!(
            Network::Mainnet.proxy_registry_address(&config),
            MAINNET_PROXY_REGISTRY_ADDRESS
        );
        // Local uses the mainnet value as placeholder
        assert_eq!(
            Network::Local.proxy_registry_address(&config),
            MAINNET_PROXY_REGISTRY_ADDRESS
        );
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("local".parse::<Network>().unwrap(), Network::Local);
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_chain_config_toml_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "network_id = 4444\nport = 9000\nmnemonic = \"{}\"",
            LOCAL_MNEMONIC
        )
        .unwrap();
        let config = ChainConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.network_id, 4444);
        assert_eq!(config.port, 9000);
        // Unspecified fields fall back to defaults
        assert_eq!(config.total_accounts, DEFAULT_TOTAL_ACCOUNTS);
        assert_eq!(config.gas_limit, DEFAULT_GAS_LIMIT);
    }

    #[test]
    fn test_default_balance_wei() {
        let config = ChainConfig::default();
        assert_eq!(
            config.default_balance_wei(),
            DEFAULT_BALANCE_ETHER * WEI_PER_ETHER
        );
    }
}
