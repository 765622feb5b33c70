//! Send UPX from the command line through a wallet daemon.
//!
//! ```text
//! uplexa-transfer --host 127.0.0.1 --port 21065 ADDRESS:AMOUNT [ADDRESS:AMOUNT ...]
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uplexa::backend::jsonrpc::{JsonRpcBackend, RpcConfig};
use uplexa::{amount, Address, Priority, TransferOptions, Wallet};

#[derive(Debug, Parser)]
#[command(name = "uplexa-transfer")]
#[command(about = "Send UPX through uplexa-wallet-rpc")]
#[command(version)]
struct Config {
    /// Wallet daemon host.
    #[arg(long, default_value = "127.0.0.1", env = "UPLEXA_WALLET_HOST")]
    host: String,

    /// Wallet daemon port.
    #[arg(long, default_value_t = 21065, env = "UPLEXA_WALLET_PORT")]
    port: u16,

    /// HTTP Basic auth user.
    #[arg(long, env = "UPLEXA_WALLET_USER")]
    user: Option<String>,

    /// HTTP Basic auth password.
    #[arg(long, env = "UPLEXA_WALLET_PASSWORD")]
    password: Option<String>,

    /// Request timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Account to send from.
    #[arg(short, long, default_value_t = 0)]
    account: u32,

    /// Fee priority: unimportant, normal, elevated or priority.
    #[arg(short, long, default_value = "normal", value_parser = parse_priority)]
    priority: Priority,

    /// Payment ID, 16 or 64 hex characters.
    #[arg(long)]
    payment_id: Option<String>,

    /// Construct the transactions but do not broadcast them.
    #[arg(long)]
    no_relay: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Destinations, each as ADDRESS:AMOUNT with the amount in UPX.
    #[arg(required = true, value_parser = parse_destination)]
    destinations: Vec<(Address, u64)>,
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    match value {
        "unimportant" => Ok(Priority::Unimportant),
        "normal" => Ok(Priority::Normal),
        "elevated" => Ok(Priority::Elevated),
        "priority" => Ok(Priority::Priority),
        other => Err(format!("unknown priority {other:?}")),
    }
}

fn parse_destination(value: &str) -> Result<(Address, u64), String> {
    let (address, upx) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected ADDRESS:AMOUNT, got {value:?}"))?;
    let address = Address::parse(address).map_err(|e| e.to_string())?;
    let atomic = amount::to_atomic(upx).map_err(|e| e.to_string())?;
    Ok((address, atomic))
}

fn main() -> Result<()> {
    let config = Config::parse();

    let filter = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let backend = JsonRpcBackend::new(&RpcConfig {
        host: config.host.clone(),
        port: config.port,
        user: config.user.clone(),
        password: config.password.clone(),
        timeout: Duration::from_secs(config.timeout),
    })
    .context("failed to build rpc client")?;
    let wallet = Wallet::open(Arc::new(backend)).context("failed to open wallet")?;

    let account = match wallet.account(config.account) {
        Some(account) => account,
        None => bail!("account {} does not exist", config.account),
    };
    info!(
        account = config.account,
        destinations = config.destinations.len(),
        "sending transfer"
    );

    let options = TransferOptions {
        priority: config.priority,
        payment_id: config.payment_id.clone(),
        unlock_time: 0,
        relay: !config.no_relay,
    };
    let transfers = account.transfer_multiple(&config.destinations, &options)?;

    for transfer in &transfers {
        println!(
            "tx {}  amount {} UPX  fee {} UPX",
            transfer.hash,
            amount::from_atomic(transfer.amount),
            amount::from_atomic(transfer.fee),
        );
        if let Some(key) = &transfer.key {
            println!("  key  {key}");
        }
        if let Some(blob) = &transfer.blob {
            println!("  blob {blob}");
        }
    }
    Ok(())
}
