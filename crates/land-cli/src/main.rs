// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LAND DAO CLI - Deployment & Sale Administration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use land_core::config::{Network, SaleConfig, LOCAL_MNEMONIC};
use land_core::WEI_PER_ETHER;
use land_sdk::{deploy_and_link, LandHandle, RpcClient, SaleHandle, SdkError, Wallet};

#[derive(Parser)]
#[command(name = "land-cli")]
#[command(about = "Land DAO sale - deployment, queries, and administration", long_about = None)]
#[command(version)]
struct Cli {
    /// RPC endpoint URL (reads LAND_RPC_URL env var, or defaults to the local dev node)
    #[arg(
        short,
        long,
        env = "LAND_RPC_URL",
        default_value = "http://localhost:8545"
    )]
    rpc: String,

    /// Wallet mnemonic (reads LAND_MNEMONIC env var, defaults to the dev phrase)
    #[arg(long, env = "LAND_MNEMONIC", default_value = LOCAL_MNEMONIC)]
    mnemonic: String,

    /// Wallet account index to sign with
    #[arg(long, default_value_t = 0)]
    account: u32,

    /// Sale config TOML (defaults to the built-in Land DAO values)
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy and link both contracts
    Deploy {
        /// Target network: local, testnet, or mainnet
        #[arg(long, default_value = "local")]
        network: Network,
    },

    /// Query chain and contract state
    Query {
        #[command(subcommand)]
        action: QueryCommands,
    },

    /// Owner administration of the sale contract
    Sale {
        #[command(subcommand)]
        action: SaleCommands,
    },
}

#[derive(Subcommand)]
enum QueryCommands {
    /// Dev accounts and their balances
    Accounts,
    /// Balance and nonce of one address
    Balance { address: String },
    /// Land token state
    Land,
    /// Sale contract state
    Sale,
    /// Receipt of a transaction hash
    Receipt { tx_hash: String },
}

#[derive(Subcommand)]
enum SaleCommands {
    /// Set a funds address slot (0 = treasury, 1..=4 = founders)
    SetFundsAddress { index: usize, address: String },
    /// Set the locked-funds unlock timestamp (unix seconds)
    SetUnlockTimestamp { timestamp: u64 },
    /// Whitelist an address with a purchase count and unit price in wei
    SetAllowance {
        address: String,
        count: u64,
        price_wei: u128,
    },
    /// Pay out owed funds (owner sweep or own share)
    Withdraw,
}

/// Resolve the deployed contract addresses from /node-info.
async fn deployed_handles(client: &RpcClient) -> Result<(LandHandle, SaleHandle), SdkError> {
    let info = client.node_info().await?;
    let land = info["land"]
        .as_str()
        .ok_or_else(|| SdkError::Decode("no land contract deployed".to_string()))?
        .to_string();
    let sale = info["land_sale"]
        .as_str()
        .ok_or_else(|| SdkError::Decode("no sale contract deployed".to_string()))?
        .to_string();
    Ok((
        LandHandle::new(client.clone(), land),
        SaleHandle::new(client.clone(), sale),
    ))
}

fn format_ether(wei: u128) -> String {
    format!("{}.{:06}", wei / WEI_PER_ETHER, (wei % WEI_PER_ETHER) / 1_000_000_000_000)
}

async fn run(cli: Cli) -> Result<(), SdkError> {
    let client = RpcClient::new(&cli.rpc);
    let wallet = Wallet::from_mnemonic(&cli.mnemonic, cli.account + 1)?;
    let signer = wallet.signer(cli.account as usize);

    let sale_config = match &cli.config {
        Some(path) => SaleConfig::load(path).map_err(|e| SdkError::Decode(e.to_string()))?,
        None => SaleConfig::default(),
    };

    match cli.command {
        Commands::Deploy { network } => {
            println!(
                "🚀 Deploying {} ({}) to {} via {}",
                sale_config.token_name.bold(),
                sale_config.token_symbol,
                network.to_string().cyan(),
                cli.rpc
            );
            let deployment = deploy_and_link(&client, signer, &sale_config, network).await?;
            println!("{}", "✅ Deployment complete".green());
            println!("  LandSale: {}", deployment.sale_address);
            println!("  Land:     {}", deployment.land_address);
        }

        Commands::Query { action } => match action {
            QueryCommands::Accounts => {
                let accounts = client.accounts().await?;
                println!("{}", "Dev accounts:".bold());
                for (i, address) in accounts.iter().enumerate() {
                    let balance = client.balance(address).await?;
                    println!("  ({}) {}  {} ETH", i, address, format_ether(balance));
                }
            }
            QueryCommands::Balance { address } => {
                let balance = client.balance(&address).await?;
                println!("{} wei ({} ETH)", balance, format_ether(balance));
            }
            QueryCommands::Land => {
                let (land, _) = deployed_handles(&client).await?;
                let summary = client.contract(&land.address).await?;
                println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
            }
            QueryCommands::Sale => {
                let (_, sale) = deployed_handles(&client).await?;
                let summary = client.contract(&sale.address).await?;
                println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
            }
            QueryCommands::Receipt { tx_hash } => {
                let receipt = client.receipt(&tx_hash).await?;
                println!(
                    "height {}  gas {}  output {}",
                    receipt.height, receipt.gas_used, receipt.output
                );
            }
        },

        Commands::Sale { action } => {
            let (_, sale) = deployed_handles(&client).await?;
            match action {
                SaleCommands::SetFundsAddress { index, address } => {
                    sale.set_funds_address(signer, index, &address).await?;
                    println!("{} slot {} → {}", "✅ funds address set".green(), index, address);
                }
                SaleCommands::SetUnlockTimestamp { timestamp } => {
                    sale.set_funds_unlock_timestamp(signer, timestamp).await?;
                    println!("{} {}", "✅ unlock timestamp set".green(), timestamp);
                }
                SaleCommands::SetAllowance {
                    address,
                    count,
                    price_wei,
                } => {
                    sale.set_allowance(signer, &address, count, price_wei).await?;
                    println!(
                        "{} {} may buy {} token(s) at {} wei",
                        "✅ allowance set:".green(),
                        address,
                        count,
                        price_wei
                    );
                }
                SaleCommands::Withdraw => {
                    let receipt = sale.withdraw(signer).await?;
                    println!("{}", "✅ withdrawal settled".green());
                    println!("  {}", receipt.output);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "❌".red(), e);
        std::process::exit(1);
    }
}
