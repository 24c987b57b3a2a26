//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::adapters::csv_account_adapter::CsvAccountAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_state_adapter::JsonStateAdapter;
use crate::adapters::order_journal_adapter::OrderJournalAdapter;
use crate::domain::account::AccountBalance;
use crate::domain::action::TradeAction;
use crate::domain::config_validation::{validate_market_config, validate_strategy_config};
use crate::domain::engine::{Decision, StrategyState};
use crate::domain::error::CrosstraderError;
use crate::domain::indicator::required_history;
use crate::domain::order::{MarketSpec, OrderIntent, build_order};
use crate::domain::params::StrategyParams;
use crate::domain::position::Side;
use crate::domain::reconcile::reconcile_ledger;
use crate::ports::account_port::AccountPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::execution_port::ExecutionPort;
use crate::ports::state_port::StatePort;

/// Number of recent fills replayed when inferring tier-1 status.
pub const FILL_HISTORY_LIMIT: usize = 300;

const DEFAULT_STATE_PATH: &str = "state.json";
const DEFAULT_BAR_LIMIT: usize = 300;

#[derive(Parser, Debug)]
#[command(name = "crosstrader", about = "SMA crossover trading engine")]
pub struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(short, long, global = true, default_value = "info", value_parser = parse_log_level)]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide on the latest bar and journal the resulting order
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Bars CSV: timestamp,open,high,low,close,volume
        #[arg(short, long)]
        bars: PathBuf,
        /// Free balance in quote currency
        #[arg(long)]
        free: f64,
        /// Total balance in quote currency
        #[arg(long)]
        total: Option<f64>,
        /// State file, overriding [state] path
        #[arg(short, long)]
        state: Option<PathBuf>,
        #[arg(short, long, default_value = "orders.csv")]
        orders: PathBuf,
        /// Print the decision without journaling or saving state
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a saved state snapshot
    Show {
        #[arg(short, long)]
        state: PathBuf,
    },
    /// Rebuild the ledger from venue positions and fills
    Reconcile {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        positions: PathBuf,
        #[arg(short, long)]
        fills: Option<PathBuf>,
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
}

/// Everything a tick needs from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub params: StrategyParams,
    pub market: MarketSpec,
    pub bar_limit: usize,
}

/// Result of one tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub action: Option<TradeAction>,
    pub order: Option<OrderIntent>,
    pub order_id: Option<String>,
    pub state: StrategyState,
}

fn parse_log_level(s: &str) -> Result<Level, String> {
    s.parse::<Level>()
        .map_err(|_| format!("unknown log level '{s}', expected trace, debug, info, warn or error"))
}

/// Install the global stderr subscriber; stdout carries action records only.
pub fn init_logging(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            bars,
            free,
            total,
            state,
            orders,
            dry_run,
        } => run_once(
            &config,
            &bars,
            AccountBalance::new(free, total.unwrap_or(0.0)),
            state.as_deref(),
            &orders,
            dry_run,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Show { state } => run_show(&state),
        Command::Reconcile {
            config,
            positions,
            fills,
            state,
        } => run_reconcile(&config, &positions, fills, state.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn finish(result: Result<(), CrosstraderError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn build_params(config: &dyn ConfigPort) -> Result<StrategyParams, CrosstraderError> {
    let d = StrategyParams::default();
    let params = StrategyParams {
        ma_fast: config.get_usize("strategy", "ma_fast", d.ma_fast),
        ma_slow: config.get_usize("strategy", "ma_slow", d.ma_slow),
        buy_pct: config.get_double("strategy", "buy_pct", d.buy_pct),
        tp1_pct: config.get_double("strategy", "tp1_pct", d.tp1_pct),
        tp2_pct: config.get_double("strategy", "tp2_pct", d.tp2_pct),
        sl_pct: config.get_double("strategy", "sl_pct", d.sl_pct),
        tp1_sell_prop: config.get_double("strategy", "tp1_sell_prop", d.tp1_sell_prop),
    };
    params.validate()?;
    Ok(params)
}

pub fn build_market_spec(config: &dyn ConfigPort) -> Result<MarketSpec, CrosstraderError> {
    let d = MarketSpec::default();
    let symbol = config
        .get_string("market", "symbol")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CrosstraderError::ConfigMissing {
            section: "market".into(),
            key: "symbol".into(),
        })?;

    Ok(MarketSpec {
        symbol: symbol.trim().to_string(),
        timeframe: config.get_string("market", "timeframe").unwrap_or(d.timeframe),
        contract_size: config.get_double("market", "contract_size", d.contract_size),
        amount_step: config.get_double("market", "amount_step", d.amount_step),
        hedge_mode: config.get_bool("market", "hedge_mode", d.hedge_mode),
        td_mode: config
            .get_string("market", "td_mode")
            .map(|s| s.trim().to_string())
            .unwrap_or(d.td_mode),
        client_id_prefix: config
            .get_string("market", "client_id_prefix")
            .unwrap_or(d.client_id_prefix),
    })
}

/// Validate every section and assemble the run settings. `bar_limit` must
/// cover the history the configured windows need.
pub fn build_settings(config: &dyn ConfigPort) -> Result<RunSettings, CrosstraderError> {
    validate_strategy_config(config)?;
    validate_market_config(config)?;
    let params = build_params(config)?;
    let bar_limit = config.get_usize("market", "bar_limit", DEFAULT_BAR_LIMIT);
    let needed = required_history(params.ma_fast, params.ma_slow);
    if bar_limit < needed {
        return Err(CrosstraderError::ConfigInvalid {
            section: "market".into(),
            key: "bar_limit".into(),
            reason: format!(
                "{bar_limit} bars cannot cover the {needed} that ma_fast={} ma_slow={} need",
                params.ma_fast, params.ma_slow
            ),
        });
    }
    Ok(RunSettings {
        params,
        market: build_market_spec(config)?,
        bar_limit,
    })
}

/// `--state` wins over `[state] path`, which wins over `state.json`.
pub fn state_path(config: &dyn ConfigPort, cli_override: Option<&Path>) -> PathBuf {
    match cli_override {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(
            config
                .get_string("state", "path")
                .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string()),
        ),
    }
}

/// Restore the saved state or start flat. Configured parameters replace
/// whatever the snapshot carried.
pub fn restore_state(
    store: &dyn StatePort,
    params: &StrategyParams,
) -> Result<StrategyState, CrosstraderError> {
    match store.load()? {
        Some(mut state) => {
            if state.params != *params {
                warn!("saved parameters differ from config; using config");
                state.params = params.clone();
            }
            Ok(state)
        }
        None => {
            info!("no saved state, starting flat");
            StrategyState::new(params.clone())
        }
    }
}

/// One trading tick. With no execution port the decision is computed but
/// neither journaled nor persisted. A ledger change with no order behind it
/// (below venue precision) is not persisted either, and the outcome carries
/// the restored state.
pub fn run_tick(
    data: &dyn DataPort,
    store: &dyn StatePort,
    execution: Option<&mut dyn ExecutionPort>,
    settings: &RunSettings,
    balance: AccountBalance,
    unix_secs: i64,
) -> Result<TickOutcome, CrosstraderError> {
    let restored = restore_state(store, &settings.params)?;
    let bars = data.fetch_bars(
        &settings.market.symbol,
        &settings.market.timeframe,
        settings.bar_limit,
    )?;

    let Decision { action, state } =
        restored.clone().decide(&bars, balance.equity(), balance.cash());
    let order = action
        .as_ref()
        .and_then(|a| build_order(a, &settings.market, unix_secs));
    if let (Some(a), None) = (&action, &order) {
        warn!(op = a.op(), size = a.size(), "order below venue precision, ledger left unchanged");
        return Ok(TickOutcome {
            action,
            order,
            order_id: None,
            state: restored,
        });
    }

    let mut order_id = None;
    if let Some(execution) = execution {
        if let Some(order) = &order {
            order_id = Some(execution.submit(order)?);
        }
        store.save(&state)?;
    }

    Ok(TickOutcome {
        action,
        order,
        order_id,
        state,
    })
}

/// Rebuild the ledger from the venue and persist it.
pub fn reconcile_state(
    account: &dyn AccountPort,
    store: &dyn StatePort,
    settings: &RunSettings,
) -> Result<StrategyState, CrosstraderError> {
    let mut state = restore_state(store, &settings.params)?;
    let positions = account.fetch_positions(&settings.market.symbol)?;
    let fills = account.fetch_fills(&settings.market.symbol, FILL_HISTORY_LIMIT)?;
    reconcile_ledger(&mut state.ledger, &positions, &fills, &settings.market);
    store.save(&state)?;
    Ok(state)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn run_once(
    config_path: &Path,
    bars_path: &Path,
    balance: AccountBalance,
    state_override: Option<&Path>,
    orders_path: &Path,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    finish(execute_run(
        &config,
        bars_path,
        balance,
        state_override,
        orders_path,
        dry_run,
    ))
}

fn execute_run(
    config: &FileConfigAdapter,
    bars_path: &Path,
    balance: AccountBalance,
    state_override: Option<&Path>,
    orders_path: &Path,
    dry_run: bool,
) -> Result<(), CrosstraderError> {
    let settings = build_settings(config)?;
    let data = CsvAdapter::new(bars_path.to_path_buf());
    let store = JsonStateAdapter::new(state_path(config, state_override));
    let _lock = if dry_run { None } else { Some(store.lock()?) };
    let mut journal = OrderJournalAdapter::new(orders_path.to_path_buf());
    let execution: Option<&mut dyn ExecutionPort> = if dry_run {
        None
    } else {
        Some(&mut journal)
    };

    let outcome = run_tick(&data, &store, execution, &settings, balance, unix_now())?;

    if let Some(action) = &outcome.action {
        let line = serde_json::to_string(&action.to_record()).map_err(|e| {
            CrosstraderError::Execution {
                reason: format!("failed to encode action: {e}"),
            }
        })?;
        println!("{line}");
    }

    print_summary(&settings, &outcome, balance, dry_run);
    Ok(())
}

fn print_summary(settings: &RunSettings, outcome: &TickOutcome, balance: AccountBalance, dry_run: bool) {
    let ledger = &outcome.state.ledger;

    eprintln!("\n===== Crosstrader Run =====");
    eprintln!(
        "Symbol: {} | Timeframe: {}",
        settings.market.symbol, settings.market.timeframe
    );

    match (&outcome.action, &outcome.order_id) {
        (Some(action), Some(id)) => eprintln!("\nOrder sent: {action} | id: {id}"),
        (Some(action), None) if dry_run => eprintln!("\nDry run, not sent: {action}"),
        (Some(action), None) => {
            eprintln!("\nNot sent (below precision), ledger unchanged: {action}")
        }
        (None, _) => eprintln!("\nNo action on this run."),
    }

    eprintln!("\n--- Account ---");
    eprintln!("Free: {:.4} Total: {:.4}", balance.free, balance.total);
    eprintln!("Equity: {:.2}", balance.equity());

    eprintln!("\n--- Ledger ---");
    for side in [Side::Long, Side::Short] {
        eprintln!(
            "{side}: {} entries, size {:.6}, completed {}",
            ledger.entries(side).len(),
            ledger.open_size(side),
            ledger.completed_trades(side)
        );
    }
    if dry_run {
        eprintln!("\nState not saved (dry run).");
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let settings = match build_settings(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let p = &settings.params;
    eprintln!("\nStrategy:");
    eprintln!("  MA windows:    fast {} / slow {} / long 120", p.ma_fast, p.ma_slow);
    eprintln!("  Buy fraction:  {}", p.buy_pct);
    eprintln!("  Tier-1 TP:     {} (sell {})", p.tp1_pct, p.tp1_sell_prop);
    eprintln!("  Tier-2 TP:     {}", p.tp2_pct);
    eprintln!("  Stop loss:     {}", p.sl_pct);

    let m = &settings.market;
    eprintln!("\nMarket:");
    eprintln!("  Symbol:        {} ({})", m.symbol, m.timeframe);
    eprintln!("  Contract size: {} step {}", m.contract_size, m.amount_step);
    eprintln!("  Hedge mode:    {} ({})", m.hedge_mode, m.td_mode);
    eprintln!("  Bars fetched:  {}", settings.bar_limit);

    eprintln!("\nState file: {}", state_path(&config, None).display());
    eprintln!("\nConfig is valid.");
    ExitCode::SUCCESS
}

fn run_show(path: &Path) -> ExitCode {
    let store = JsonStateAdapter::new(path.to_path_buf());
    let state = match store.load() {
        Ok(Some(s)) => s,
        Ok(None) => {
            eprintln!("error: no state at {}", path.display());
            return ExitCode::from(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match state.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    eprintln!("State: {}", path.display());
    for side in [Side::Long, Side::Short] {
        let entries = state.ledger.entries(side);
        eprintln!(
            "\n{side} entries: {} (completed {})",
            entries.len(),
            state.ledger.completed_trades(side)
        );
        for (i, e) in entries.iter().enumerate() {
            eprintln!(
                "  [{i}] price {:.2} size {:.6} tp1_done {}",
                e.price, e.size, e.tp1_done
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_reconcile(
    config_path: &Path,
    positions_path: &Path,
    fills_path: Option<PathBuf>,
    state_override: Option<&Path>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    finish(execute_reconcile(
        &config,
        positions_path,
        fills_path,
        state_override,
    ))
}

fn execute_reconcile(
    config: &FileConfigAdapter,
    positions_path: &Path,
    fills_path: Option<PathBuf>,
    state_override: Option<&Path>,
) -> Result<(), CrosstraderError> {
    let settings = build_settings(config)?;
    let account = CsvAccountAdapter::new(positions_path.to_path_buf(), fills_path);
    let store = JsonStateAdapter::new(state_path(config, state_override));
    let _lock = store.lock()?;
    let state = reconcile_state(&account, &store, &settings)?;

    for side in [Side::Long, Side::Short] {
        match state.ledger.entries(side).first() {
            Some(e) => eprintln!(
                "{side}: price {:.2} size {:.6} tp1_done {}",
                e.price, e.size, e.tp1_done
            ),
            None => eprintln!("{side}: flat"),
        }
    }
    eprintln!("State saved to {}", store.path().display());
    Ok(())
}
