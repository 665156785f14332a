//! Waste bank CLI
//!
//! Command-line front end for the digital waste bank ledger.
//!
//! # Usage
//!
//! ```bash
//! waste-bank deposit '{"code":"DEP-1","userId":"u1","wasteType":"plastic","weightKg":"2.5","pricePerKg":"3000","pointsPerKg":"10"}'
//! waste-bank redeem --user u1 --reward R002
//! waste-bank redeem --user u1 --reward R002 --no-sync
//! waste-bank sync
//! waste-bank --api-url http://localhost:3001 --timeout-ms 2000 reconcile <ID>
//! waste-bank history --user u1
//! ```
//!
//! The ledger lives in a JSON file (`--data-file`, default `waste-bank.json`).
//! Command results are printed to stdout; logs go to stderr and are filtered
//! with `RUST_LOG` (default `waste_bank=info`).
//!
//! # Exit Codes
//!
//! - 0: Success (including redemptions left pending for a later sync)
//! - 1: Error (insufficient balance, unknown reward, unreadable ledger, etc.)

use std::process;
use tracing_subscriber::EnvFilter;
use waste_bank::cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("waste_bank=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    // Parse command-line arguments using clap
    let args = cli::parse_args();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let mut output = std::io::stdout();
    if let Err(e) = runtime.block_on(cli::run(args, &mut output)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
