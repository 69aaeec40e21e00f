use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use subnet_monitor::{
    apis::backend::{BackendApi, BackendClient},
    config::{self, Config},
    dashboard::{DashboardSummary, PollingController},
    logger::{self, LogTag, LoggerConfig},
    notifications::{build_notifiers, NotificationBridge},
    paths,
    services::{
        implementations::{NotificationsService, PollerService},
        ServiceManager,
    },
    storage::{FileKvStore, HistoryStore, KvStore, NoteStore},
};

#[derive(Parser)]
#[command(name = "subnet-monitor")]
#[command(about = "Monitor miners registered on a subnet", long_about = None)]
struct Cli {
    /// Config file (defaults to the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable DEBUG output for a tag (repeatable, or `all`)
    #[arg(long = "debug", value_name = "TAG", global = true)]
    debug: Vec<String>,

    /// Show VERBOSE output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the poller, alert loop and dashboard until Ctrl+C (default)
    Run,
    /// Poll once and print the miner table with totals
    Snapshot,
    /// Manage local notes keyed by miner symbol
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
    /// Manage the backend coldkey watchlist
    Coldkey {
        #[command(subcommand)]
        action: ColdkeyAction,
    },
    /// Change the monitored subnet
    Subnet {
        #[command(subcommand)]
        action: SubnetAction,
    },
}

#[derive(Subcommand)]
enum NoteAction {
    Get { key: String },
    /// Blank text removes the note
    Set { key: String, text: String },
    List,
}

#[derive(Subcommand)]
enum ColdkeyAction {
    Add { coldkey: String },
    Remove { coldkey: String },
    List,
}

#[derive(Subcommand)]
enum SubnetAction {
    Set { subnet: String },
}

struct Components {
    config: Config,
    controller: Arc<PollingController>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    let mut logger_config = LoggerConfig::from_flags(&cli.debug, cli.verbose, cli.quiet);
    logger_config.log_file = Some(paths::get_log_file_path());
    logger::init(logger_config);

    let result = run(cli).await;
    if let Err(e) = &result {
        logger::error(LogTag::System, &format!("{:#}", e));
    }
    logger::flush();

    if result.is_err() {
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(paths::get_config_path);
    config::load_config_from_path(&config_path)
        .map_err(anyhow::Error::msg)
        .context("Configuration error")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_monitor(build_components()?).await,
        Command::Snapshot => snapshot(build_components()?).await,
        Command::Note { action } => note(action, build_notes()),
        Command::Coldkey { action } => coldkey(action, build_components()?).await,
        Command::Subnet {
            action: SubnetAction::Set { subnet },
        } => {
            let components = build_components()?;
            components.controller.change_subnet(&subnet).await?;
            println!("Subnet updated to \"{}\"", subnet.trim());
            Ok(())
        }
    }
}

fn storage() -> Arc<dyn KvStore> {
    Arc::new(FileKvStore::new(paths::get_storage_directory()))
}

fn build_notes() -> Arc<NoteStore> {
    Arc::new(NoteStore::open(storage()))
}

fn build_components() -> Result<Components> {
    let config = config::get_config_clone();
    let storage = storage();

    let notes = Arc::new(NoteStore::open(Arc::clone(&storage)));
    let history = Arc::new(HistoryStore::open(
        storage,
        config.history.max_points_per_series,
    ));
    let client = BackendClient::new(&config.api).context("Failed to build backend client")?;
    logger::debug(
        LogTag::System,
        &format!("Backend endpoint: {}", client.base_url()),
    );
    let backend: Arc<dyn BackendApi> = Arc::new(client);

    Ok(Components {
        controller: Arc::new(PollingController::new(backend, notes, history)),
        config,
    })
}

async fn run_monitor(components: Components) -> Result<()> {
    let Components { config, controller } = components;
    logger::info(LogTag::System, "🚀 Subnet monitor starting up...");

    let mut manager = ServiceManager::new();
    manager.register(Box::new(PollerService::new(
        Arc::clone(&controller),
        Duration::from_secs(config.polling.interval_secs),
    )));

    let bridge = Arc::new(NotificationBridge::new(
        Arc::clone(controller.backend()),
        build_notifiers(&config.notifications),
    ));
    manager.register(Box::new(NotificationsService::new(
        bridge,
        Duration::from_secs(config.polling.notification_interval_secs),
        config.notifications.enabled,
    )));

    #[cfg(feature = "web")]
    {
        use subnet_monitor::services::implementations::WebserverService;
        use subnet_monitor::webserver::AppState;

        let state = Arc::new(AppState::new(
            Arc::clone(&controller),
            config.history.clone(),
            config.polling.interval_secs,
        ));
        manager.register(Box::new(WebserverService::new(
            config.webserver.clone(),
            state,
        )));
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("Failed to install Ctrl+C handler")?;

    if let Err(e) = manager.start_all().await {
        let _ = manager.stop_all().await;
        anyhow::bail!("Service startup failed: {}", e);
    }

    rx.recv().await;
    logger::info(LogTag::System, "🛑 Received Ctrl+C, shutting down...");

    manager.stop_all().await.map_err(anyhow::Error::msg)?;
    if let Err(e) = controller.history().persist() {
        logger::warning(LogTag::Storage, &format!("Failed to persist history: {}", e));
    }

    logger::info(LogTag::System, "✅ Shutdown complete");
    Ok(())
}

async fn snapshot(components: Components) -> Result<()> {
    let controller = components.controller;
    let report = controller.refresh().await;

    if let Some(error) = controller.error_banner() {
        eprintln!("⚠️  {}", error);
    }
    logger::debug(
        LogTag::System,
        &format!(
            "Snapshot cycle: applied={} failed={} history_points={}",
            report.applied.len(),
            report.failed.len(),
            report.history_points
        ),
    );

    let table = controller.table_view();
    let rows: Vec<usize> = (0..table.row_count()).collect();
    println!("{}", table.render(&rows));

    println!("{}", snapshot_footer(&controller.summary()));
    Ok(())
}

/// Subnet line followed by the totals block
fn snapshot_footer(summary: &DashboardSummary) -> String {
    let totals = &summary.aggregates;
    format!(
        "Subnet: {}   Immune period: {}\n\
         Miners: {} total, {} registered, {} deregistered\n\
         Daily alpha: {:.2}   Staked alpha: {:.2}\n\
         Daily earn: ${:.2}   Staked value: ${:.2}",
        summary.settings.subnet_id.as_deref().unwrap_or("-"),
        summary.immune_period_display,
        totals.total_miner_num,
        totals.registered_miner_num,
        totals.deregistered_miner_num,
        totals.total_daily_alpha,
        totals.total_staking_alpha,
        totals.daily_earn_usd,
        totals.total_staking_usd
    )
}

fn note(action: NoteAction, notes: Arc<NoteStore>) -> Result<()> {
    match action {
        NoteAction::Get { key } => match notes.get(&key) {
            Some(text) => println!("{}", text),
            None => println!("(no note for {})", key),
        },
        NoteAction::Set { key, text } => {
            notes.set(&key, &text);
            notes.persist().context("Failed to save notes")?;
        }
        NoteAction::List => {
            for (key, text) in notes.all() {
                println!("{:<16} {}", key, text);
            }
        }
    }
    Ok(())
}

async fn coldkey(action: ColdkeyAction, components: Components) -> Result<()> {
    let controller = components.controller;
    match action {
        ColdkeyAction::Add { coldkey } => {
            // Load the current watchlist so duplicates are detected
            controller.refresh().await;
            if controller.add_coldkey(&coldkey).await? {
                println!("Added {}", coldkey.trim());
            } else {
                println!("{} is already watched", coldkey.trim());
            }
        }
        ColdkeyAction::Remove { coldkey } => {
            controller.remove_coldkey(&coldkey).await?;
            println!("Removed {}", coldkey.trim());
        }
        ColdkeyAction::List => {
            let coldkeys = controller.backend().fetch_coldkeys().await?;
            for coldkey in coldkeys {
                println!("{}", coldkey);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use subnet_monitor::dashboard::DashboardState;
    use subnet_monitor::miners::Aggregates;

    #[test]
    fn test_snapshot_footer_without_subnet() {
        let footer = snapshot_footer(&DashboardState::default().summary());
        assert!(footer.starts_with("Subnet: -   Immune period: 0 (0h, 0m)\n"));
        assert!(footer.contains("Miners: 0 total, 0 registered, 0 deregistered"));
    }

    #[test]
    fn test_snapshot_footer_with_totals() {
        let mut state = DashboardState::default();
        state.settings.subnet_id = Some("42".to_string());
        state.settings.immune_period = 7205;
        state.aggregates = Aggregates {
            total_daily_alpha: 1.75,
            total_staking_alpha: 120.5,
            total_miner_num: 2,
            registered_miner_num: 1,
            deregistered_miner_num: 1,
            daily_earn_usd: 350.0,
            total_staking_usd: 24100.0,
        };

        let footer = snapshot_footer(&state.summary());
        let lines: Vec<&str> = footer.lines().collect();
        assert_eq!(lines[0], "Subnet: 42   Immune period: 7205 (24h, 1m)");
        assert_eq!(lines[1], "Miners: 2 total, 1 registered, 1 deregistered");
        assert_eq!(lines[2], "Daily alpha: 1.75   Staked alpha: 120.50");
        assert_eq!(lines[3], "Daily earn: $350.00   Staked value: $24100.00");
    }
}
