use crate::gateway::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use crate::gateway::GatewayConfig;
use crate::types::GUEST_USER;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Digital waste bank ledger: deposits, withdrawals and reward redemptions
#[derive(Parser, Debug)]
#[command(name = "waste-bank")]
#[command(about = "Digital waste bank ledger with remote redemption reconciliation", long_about = None)]
pub struct CliArgs {
    /// Ledger snapshot file
    #[arg(
        long = "data-file",
        value_name = "PATH",
        env = "WASTE_BANK_DATA",
        default_value = "waste-bank.json",
        help = "Path to the JSON ledger file"
    )]
    pub data_file: PathBuf,

    /// Base URL of the order-processing service
    #[arg(
        long = "api-url",
        value_name = "URL",
        env = "WASTE_BANK_API_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Base URL of the redemption service"
    )]
    pub api_url: String,

    /// Timeout for every remote call
    #[arg(
        long = "timeout-ms",
        value_name = "MS",
        env = "WASTE_BANK_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        help = "Timeout for remote calls in milliseconds (default: 5000)"
    )]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Exchange points for a reward and try to settle it right away
    Redeem {
        #[arg(long, default_value = GUEST_USER)]
        user: String,
        /// Reward id from the catalog
        #[arg(long)]
        reward: String,
        /// Only register the redemption, do not contact the service
        #[arg(long = "no-sync")]
        no_sync: bool,
    },
    /// Settle one pending redemption
    Reconcile {
        /// Redemption id
        id: String,
    },
    /// Settle every pending redemption
    Sync,
    /// Credit a deposit from the JSON text of a scanned QR code
    Deposit {
        #[arg(value_name = "PAYLOAD")]
        payload: String,
    },
    /// Pay out cash from a user's balance
    Withdraw {
        #[arg(long)]
        user: String,
        #[arg(long)]
        amount: Decimal,
    },
    /// Show a user's balances
    Balance {
        #[arg(long)]
        user: String,
    },
    /// List redemptions, optionally for one user
    History {
        #[arg(long)]
        user: Option<String>,
    },
    /// List credited deposits, optionally for one user
    Deposits {
        #[arg(long)]
        user: Option<String>,
    },
    /// List the reward catalog
    Rewards,
    /// Probe the redemption service
    Health,
}

impl CliArgs {
    /// Create a GatewayConfig from CLI arguments
    ///
    /// Invalid values fall back to defaults with a warning.
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(&self.api_url, self.timeout_ms)
    }
}
