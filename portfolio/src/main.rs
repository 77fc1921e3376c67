//! SaveVault command-line client
//!
//! Calculator, plan browser, deposit report and admin totals over a JSON
//! snapshot of the savings bank contracts, plus a watch loop that reports
//! maturities and closures as they happen.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use savevault_model::{format_amount, parse_amount, rate_breakdown, Plan, Quote, RateBreakdown, Timestamp};
use savevault_portfolio::{
    build_portfolio, report, vault_overview, ClosedDeposits, Config, Snapshot, WatchEvent, Watcher,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time;

#[derive(Parser)]
#[command(name = "savevault", version, about = "Fixed-term savings vault client")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Quote interest and payouts for an amount and term
    Calc {
        /// Token amount, e.g. 10000 or 12.5
        #[arg(long)]
        amount: String,
        #[arg(long, default_value_t = 90)]
        days: u32,
        /// Defaults to the configured plan with the same duration
        #[arg(long)]
        apr_bps: Option<u32>,
        #[arg(long)]
        penalty_bps: Option<u32>,
    },

    /// List plans with a quote for each
    Plans {
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Quote this amount instead of each plan's minimum
        #[arg(long)]
        amount: Option<String>,
    },

    /// Show a wallet's deposits grouped by state
    Deposits {
        #[arg(long, env = "SAVEVAULT_WALLET")]
        wallet: String,
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Evaluate at this unix time instead of now
        #[arg(long)]
        now: Option<Timestamp>,
    },

    /// Vault-wide totals
    Overview {
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        now: Option<Timestamp>,
    },

    /// Re-read the snapshot periodically and log state changes
    Watch {
        #[arg(long, env = "SAVEVAULT_WALLET")]
        wallet: String,
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Write a default config file
    InitConfig {
        #[arg(long, default_value = "savevault.toml")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        return Config::write_default(path);
    }

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default Sepolia config", e);
        Config::default_sepolia()
    });
    log::debug!(
        "Chain {}, savings bank {}",
        config.chain_id,
        config.savings_bank_address
    );

    match cli.command {
        Command::Calc {
            amount,
            days,
            apr_bps,
            penalty_bps,
        } => run_calc(&config, &amount, days, apr_bps, penalty_bps, cli.json),
        Command::Plans { snapshot, amount } => {
            let snapshot = load_snapshot(&config, snapshot.as_deref())?;
            let amount = amount
                .map(|a| parse_amount(&a).context(format!("Invalid amount: {}", a)))
                .transpose()?;
            let offers = report::plan_offers(snapshot.plans(), amount);
            if cli.json {
                print_json(&offers)
            } else {
                print!("{}", report::render_plans(&offers));
                Ok(())
            }
        }
        Command::Deposits {
            wallet,
            snapshot,
            now,
        } => {
            let snapshot = load_snapshot(&config, snapshot.as_deref())?;
            let now = match now {
                Some(now) => now,
                None => unix_now()?,
            };
            let mut closed = load_closed(&config)?;
            let portfolio = build_portfolio(&snapshot, &wallet, now, &mut closed);
            closed.save().context("Failed to save closed-deposit store")?;

            if cli.json {
                print_json(&portfolio)
            } else {
                print!("{}", report::render_portfolio(&portfolio));
                Ok(())
            }
        }
        Command::Overview { snapshot, now } => {
            let snapshot = load_snapshot(&config, snapshot.as_deref())?;
            let now = match now {
                Some(now) => now,
                None => unix_now()?,
            };
            let overview = vault_overview(&snapshot, now);
            if cli.json {
                print_json(&overview)
            } else {
                print!("{}", report::render_overview(&overview));
                Ok(())
            }
        }
        Command::Watch { wallet, snapshot } => {
            let path = snapshot.unwrap_or_else(|| config.snapshot_path());
            watch(&config, &wallet, &path).await
        }
        Command::InitConfig { .. } => Ok(()),
    }
}

fn run_calc(
    config: &Config,
    amount: &str,
    days: u32,
    apr_bps: Option<u32>,
    penalty_bps: Option<u32>,
    json: bool,
) -> Result<()> {
    let principal = parse_amount(amount).context(format!("Invalid amount: {}", amount))?;
    let preset = config.preset_for_days(days);

    let apr_bps = apr_bps
        .or(preset.map(|p| p.apr_bps))
        .unwrap_or(config.default_apr_bps);
    let penalty_bps = penalty_bps.or(preset.map(|p| p.penalty_bps)).unwrap_or(0);

    let plan = Plan {
        plan_id: 0,
        name: preset.map(|p| p.name.clone()).unwrap_or_default(),
        duration_days: days,
        apr_bps,
        min_deposit: 0,
        max_deposit: 0,
        early_withdraw_penalty_bps: penalty_bps,
        enabled: true,
    };
    let quote = plan.quote(principal);

    if json {
        #[derive(Serialize)]
        struct CalcOutput {
            apr_bps: u32,
            term_days: u32,
            penalty_bps: u32,
            quote: Quote,
            breakdown: RateBreakdown,
        }
        print_json(&CalcOutput {
            apr_bps,
            term_days: days,
            penalty_bps,
            quote,
            breakdown: rate_breakdown(apr_bps, days, &quote),
        })
    } else {
        print!("{}", report::render_quote(&quote, apr_bps, days, penalty_bps));
        Ok(())
    }
}

/// Poll the snapshot and log deposits that matured or closed since the last tick
async fn watch(config: &Config, wallet: &str, snapshot_path: &Path) -> Result<()> {
    let mut closed = load_closed(config)?;
    let mut watcher = Watcher::new();

    log::info!(
        "Watching {} via {} every {}s",
        wallet,
        snapshot_path.display(),
        config.poll_interval_secs
    );

    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopping watch");
                break;
            }
        }

        if let Err(e) = watch_tick(wallet, snapshot_path, &mut closed, &mut watcher) {
            log::error!("Watch tick failed: {:#}", e);
        }
    }

    closed.save().context("Failed to save closed-deposit store")?;
    Ok(())
}

fn watch_tick(
    wallet: &str,
    snapshot_path: &Path,
    closed: &mut ClosedDeposits,
    watcher: &mut Watcher,
) -> Result<()> {
    let snapshot = Snapshot::load(snapshot_path)?;
    let now = unix_now()?;
    let portfolio = build_portfolio(&snapshot, wallet, now, closed);

    for event in watcher.observe(&portfolio) {
        match event {
            WatchEvent::Matured {
                deposit_id,
                maturity_amount,
            } => log::info!(
                "Deposit {} reached maturity, {} available",
                deposit_id,
                format_amount(maturity_amount)
            ),
            WatchEvent::Moved { deposit_id, from, to } => {
                log::info!("Deposit {}: {} -> {}", deposit_id, from.as_str(), to.as_str())
            }
            WatchEvent::Appeared { deposit_id, bucket } => {
                log::info!("New deposit {} ({})", deposit_id, bucket.as_str())
            }
        }
    }

    if let Some(next) = watcher.queue().peek() {
        log::debug!(
            "Next maturity: deposit {} at {} ({} queued)",
            next.deposit_id,
            next.maturity_time,
            watcher.queue().len()
        );
    }

    let needs_action = portfolio.views().filter(|v| v.bucket.needs_action()).count();
    if needs_action > 0 {
        log::info!("{} matured deposit(s) awaiting withdrawal or renewal", needs_action);
    }

    closed.save()?;
    Ok(())
}

fn load_snapshot(config: &Config, path: Option<&Path>) -> Result<Snapshot> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(|| config.snapshot_path());
    let snapshot = Snapshot::load(&path)?;
    if snapshot.chain_id != config.chain_id {
        log::warn!(
            "Snapshot is for chain {}, config expects {}",
            snapshot.chain_id,
            config.chain_id
        );
    }
    Ok(snapshot)
}

fn load_closed(config: &Config) -> Result<ClosedDeposits> {
    let path = config.closed_store_path();
    ClosedDeposits::load(&path)
        .context(format!("Failed to load closed-deposit store {}", path.display()))
}

fn unix_now() -> Result<Timestamp> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the unix epoch")?
        .as_secs();
    Timestamp::try_from(secs).context("System clock out of range")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
