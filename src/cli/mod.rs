// CLI module
// Command-line interface, argument parsing and command dispatch

mod args;

pub use args::{CliArgs, Command};

use crate::core::WasteBank;
use crate::gateway::HttpGateway;
use crate::io::JsonFileStore;
use crate::types::{Account, DepositPayload, RedemptionStatus, RewardCatalog, WasteBankError};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing subcommand, or --help),
/// clap displays an error message or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Execute one command against the ledger file and remote service
///
/// Results go to `output`; progress and diagnostics go through `tracing`.
/// A redemption that could not be settled is not an error: it is reported as
/// pending and left for a later `sync`.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments
/// * `output` - Sink for command results (stdout in the binary)
///
/// # Returns
///
/// * `Ok(())` - If the command ran
/// * `Err(WasteBankError)` - If the command was refused or the ledger could
///   not be loaded or saved
pub async fn run(args: CliArgs, output: &mut dyn Write) -> Result<(), WasteBankError> {
    let gateway = Arc::new(HttpGateway::new(args.to_gateway_config())?);

    if let Command::Health = args.command {
        gateway.health().await?;
        writeln!(output, "ok {}", gateway.config().base_url)?;
        return Ok(());
    }

    let store = Arc::new(JsonFileStore::new(args.data_file));
    let bank = WasteBank::open(gateway, store).await?;
    execute(&bank, args.command, output).await
}

/// Run a ledger command; `Health` never reaches here
async fn execute(
    bank: &WasteBank,
    command: Command,
    output: &mut dyn Write,
) -> Result<(), WasteBankError> {
    let catalog = RewardCatalog::default();

    match command {
        Command::Redeem {
            user,
            reward,
            no_sync,
        } => {
            let reward = catalog.get(&reward)?;
            if no_sync {
                let record = bank.redeem(&user, reward).await?;
                writeln!(output, "redemption {} registered, pending processing", record.id)?;
                return Ok(());
            }

            let outcome = bank.redeem_and_reconcile(&user, reward).await?;
            let record = outcome.record;
            match (record.status, outcome.unresolved) {
                (RedemptionStatus::Completed, _) => {
                    writeln!(output, "redemption {} completed", record.id)?
                }
                (RedemptionStatus::Failed, _) => {
                    if let Some(rejection) = record.rejection() {
                        writeln!(output, "{}", rejection)?;
                    }
                }
                (RedemptionStatus::Pending, reason) => {
                    writeln!(
                        output,
                        "redemption {} registered, pending processing{}",
                        record.id,
                        reason.map(|e| format!(" ({})", e)).unwrap_or_default()
                    )?;
                }
            }
        }
        Command::Reconcile { id } => match bank.reconcile(&id).await {
            Ok(record) => writeln!(output, "redemption {} {}", record.id, record.status)?,
            Err(e) if e.is_transport() => {
                writeln!(output, "redemption {} still pending ({})", id, e)?
            }
            Err(e) => return Err(e),
        },
        Command::Sync => {
            let report = bank.sync_pending().await?;
            writeln!(
                output,
                "synced pending redemptions: attempted {}, resolved {}",
                report.attempted, report.resolved
            )?;
        }
        Command::Deposit { payload } => {
            let payload = DepositPayload::parse(&payload)?;
            let (record, account) = bank.deposit(&payload).await?;
            writeln!(
                output,
                "deposit {} credited to {}: +{} balance, +{} points (balance {}, points {})",
                record.code,
                record.user_id,
                record.amount,
                record.points,
                account.balance,
                account.points
            )?;
        }
        Command::Withdraw { user, amount } => {
            let account = bank.withdraw(&user, amount).await?;
            writeln!(
                output,
                "withdrew {} for {} (balance {})",
                amount, account.user_id, account.balance
            )?;
        }
        Command::Balance { user } => {
            let account = bank.account(&user).unwrap_or_else(|| Account::new(user));
            writeln!(output, "{}", serde_json::to_string_pretty(&account)?)?;
        }
        Command::History { user } => {
            let records = match user {
                Some(user) => bank.redemptions_for(&user),
                None => bank.redemptions(),
            };
            writeln!(output, "{}", serde_json::to_string_pretty(&records)?)?;
        }
        Command::Deposits { user } => {
            let deposits = match user {
                Some(user) => bank.deposits_for(&user),
                None => bank.deposits(),
            };
            writeln!(output, "{}", serde_json::to_string_pretty(&deposits)?)?;
        }
        Command::Rewards => {
            for reward in catalog.rewards() {
                writeln!(output, "{}\t{}\t{}", reward.id, reward.points, reward.name)?;
            }
        }
        Command::Health => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DepositRecord;
    use tempfile::tempdir;

    fn args(data_file: &std::path::Path, rest: &[&str]) -> CliArgs {
        let data_file = data_file.to_string_lossy().to_string();
        let mut argv = vec![
            "program",
            "--data-file",
            data_file.as_str(),
            "--api-url",
            "http://127.0.0.1:9",
            "--timeout-ms",
            "200",
        ];
        argv.extend_from_slice(rest);
        CliArgs::try_parse_from(argv).unwrap()
    }

    async fn run_to_string(args: CliArgs) -> Result<String, WasteBankError> {
        let mut output = Vec::new();
        run(args, &mut output).await?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_deposit_then_redeem_without_service() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("ledger.json");
        let payload = r#"{"code":"DEP-1","userId":"u1","wasteType":"plastic","weightKg":"50","pricePerKg":"3000","pointsPerKg":"100"}"#;

        let out = run_to_string(args(&data, &["deposit", payload])).await.unwrap();
        assert!(out.contains("deposit DEP-1 credited to u1"));

        let out = run_to_string(args(&data, &["redeem", "--user", "u1", "--reward", "R006"]))
            .await
            .unwrap();
        assert!(out.contains("pending processing"));

        let out = run_to_string(args(&data, &["balance", "--user", "u1"])).await.unwrap();
        let account: Account = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(account.points, 0);

        let out = run_to_string(args(&data, &["history", "--user", "u1"])).await.unwrap();
        assert!(out.contains("\"status\": \"pending\""));

        let out = run_to_string(args(&data, &["sync"])).await.unwrap();
        assert!(out.contains("attempted 1, resolved 0"));

        let out = run_to_string(args(&data, &["deposits", "--user", "u1"])).await.unwrap();
        let deposits: Vec<DepositRecord> = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].code, "DEP-1");
        assert_eq!(deposits[0].points, 5000);

        let out = run_to_string(args(&data, &["deposits", "--user", "u2"])).await.unwrap();
        assert_eq!(out.trim(), "[]");
    }

    #[tokio::test]
    async fn test_redeem_unknown_reward() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("ledger.json");

        let err = run_to_string(args(&data, &["redeem", "--user", "u1", "--reward", "R999"]))
            .await
            .unwrap_err();
        assert_eq!(err, WasteBankError::reward_not_found("R999"));
    }

    #[tokio::test]
    async fn test_rewards_lists_catalog() {
        let dir = tempdir().unwrap();
        let out = run_to_string(args(&dir.path().join("ledger.json"), &["rewards"]))
            .await
            .unwrap();
        assert_eq!(out.lines().count(), RewardCatalog::default().rewards().len());
        assert!(out.starts_with("R001\t1000\t"));
    }
}
