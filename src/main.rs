use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sales_board::api::{build_router, state::AppState};
use sales_board::board::{BoardRunner, Dashboard, RunOutcome};
use sales_board::calculate::window;
use sales_board::config::AppConfig;
use sales_board::models::{
    format_euros, BoardStatus, BoardUpdate, Metric, NewSale, RecordId, Snapshot, TeamName,
    Targets, ViewState,
};
use sales_board::storage::{JsonlFeed, JsonlStore, StorageConfig};

#[derive(Parser)]
#[command(name = "sales-board")]
#[command(about = "Real-time sales leaderboard with KPIs, rankings and badges")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the board and serve it over HTTP
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run the board and print every update as a JSON line
    Watch,

    /// Compute the board once from the current data and print it
    Snapshot {
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a new sale
    AddSale {
        /// Agent name (must be on a roster)
        #[arg(long)]
        agent: String,

        /// Upfront amount (blank means 0)
        #[arg(long)]
        upfront: Option<String>,

        /// Monitoring amount (blank means 0)
        #[arg(long)]
        monitoring: Option<String>,

        /// Sale date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a sale by id
    DeleteSale {
        /// Sale id as shown by `snapshot --json` or `add-sale`
        id: String,
    },

    /// Overwrite the targets document
    SetTargets {
        #[arg(long)]
        daily: String,

        #[arg(long)]
        weekly: String,

        #[arg(long)]
        monthly: String,

        #[arg(long)]
        avg_revenue: String,

        #[arg(long)]
        avg_upfront: String,
    },

    /// Print the current targets
    ShowTargets,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = PathBuf::from(&cli.config);
    let mut config = AppConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting sales-board v{}", env!("CARGO_PKG_VERSION"));
    if !config_path.exists() {
        tracing::info!("No config at {:?}, using defaults", config_path);
    }

    let store = JsonlStore::new(StorageConfig::new(config.data_dir.clone()));

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let (status_tx, status_rx) = watch::channel(BoardStatus::default());
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let runner = BoardRunner::new(dashboard(&config)?, Arc::new(store.clone()), Arc::new(status_tx));
            let feed = JsonlFeed::new(store, config.board.poll_interval());
            let board = tokio::spawn(async move { runner.subscribe_and_run(&feed, shutdown_rx).await });

            let app = build_router(AppState::new(status_rx), &config.server.cors_origin);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Board API: http://{}/api/board", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Shutting down");
                })
                .await?;

            let _ = shutdown_tx.send(true);
            report_outcome(board.await??);
        }
        Commands::Watch => {
            let (update_tx, mut update_rx) = mpsc::unbounded_channel::<BoardUpdate>();
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let runner = BoardRunner::new(dashboard(&config)?, Arc::new(store.clone()), Arc::new(update_tx));
            let feed = JsonlFeed::new(store, config.board.poll_interval());
            let board = tokio::spawn(async move { runner.subscribe_and_run(&feed, shutdown_rx).await });

            loop {
                tokio::select! {
                    update = update_rx.recv() => match update {
                        Some(update) => println!("{}", serde_json::to_string(&update)?),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        let _ = shutdown_tx.send(true);
                        break;
                    }
                }
            }

            report_outcome(board.await??);
        }
        Commands::Snapshot { json } => {
            let parsed = store.read_records()?;
            let targets = match store.read_targets() {
                Ok(targets) => targets.unwrap_or_default(),
                Err(e) => {
                    tracing::warn!("Failed to read targets, using zero targets: {}", e);
                    Targets::default()
                }
            };

            let mut board = dashboard(&config)?;
            let view = board.recompute(&Snapshot::baseline(parsed.records), &targets, Utc::now());

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
        }
        Commands::AddSale {
            agent,
            upfront,
            monitoring,
            date,
        } => {
            let roster = config.roster()?;
            if !roster.contains(agent.trim()) {
                bail!("Unknown agent {:?}: not on any roster", agent);
            }

            let now = Utc::now();
            let date = date.unwrap_or_else(|| {
                window::reference_day(now, config.board.utc_offset())
                    .format("%Y-%m-%d")
                    .to_string()
            });
            let record = NewSale {
                agent,
                upfront,
                monitoring,
                date: Some(date),
            }
            .into_record(now)?;

            store.append_record(&record)?;
            println!("Added sale {} for {}", record.id, record.agent);
        }
        Commands::DeleteSale { id } => {
            let removed = store.delete_record(&RecordId::new(id))?;
            println!(
                "Deleted sale {} ({}, {})",
                removed.id, removed.agent, removed.date
            );
        }
        Commands::SetTargets {
            daily,
            weekly,
            monthly,
            avg_revenue,
            avg_upfront,
        } => {
            let targets = Targets::parse_entered([
                daily.as_str(),
                weekly.as_str(),
                monthly.as_str(),
                avg_revenue.as_str(),
                avg_upfront.as_str(),
            ])?;
            store.write_targets(&targets)?;
            println!("Targets saved");
        }
        Commands::ShowTargets => match store.read_targets()? {
            Some(targets) => {
                for metric in Metric::ALL {
                    println!("{:<12} {}", metric.key(), format_target(metric, &targets));
                }
            }
            None => println!("No targets set"),
        },
    }

    Ok(())
}

fn dashboard(config: &AppConfig) -> Result<Dashboard> {
    Ok(Dashboard::new(
        config.roster()?,
        config.board.event_windows(),
        config.board.utc_offset(),
    ))
}

fn report_outcome(outcome: RunOutcome) {
    match outcome {
        RunOutcome::Shutdown => tracing::info!("Board stopped"),
        RunOutcome::Disconnected => tracing::warn!("Board stopped: record feed disconnected"),
    }
}

fn format_target(metric: Metric, targets: &Targets) -> String {
    let value = targets.get(metric);
    if metric.is_monetary() {
        format_euros(value)
    } else {
        value.to_string()
    }
}

fn print_view(view: &ViewState) {
    let kpis = &view.kpis;
    println!("=== KPIs ===");
    println!("Sales today:      {}", kpis.daily);
    println!("Sales this week:  {}", kpis.weekly);
    println!("Sales this month: {}", kpis.monthly);
    println!("Avg revenue:      {}", format_euros(kpis.avg_revenue));
    println!("Avg upfront:      {}", format_euros(kpis.avg_upfront));
    println!();
    for metric in Metric::ALL {
        let progress = kpis.progress.get(metric);
        println!(
            "{:<12} {:>6.1}%  {}",
            metric.key(),
            progress.percent,
            progress.label()
        );
    }

    for team in TeamName::ALL {
        println!();
        println!("=== {} ===", team);
        println!(
            "{:>4}  {:<12} {:>5} {:>5} {:>5} {:>10} {:>10}  Badges",
            "#", "Agent", "Day", "Week", "Month", "Upfront", "Monitoring"
        );
        for row in view.team(team) {
            let badges: Vec<&str> = row.badges.iter().map(|b| b.icon.as_str()).collect();
            println!(
                "{:>4}{} {:<12} {:>5} {:>5} {:>5} {:>10} {:>10}  {}",
                row.rank,
                if row.moved_up { "↑" } else { " " },
                row.agent,
                row.stats.daily_count,
                row.stats.weekly_count,
                row.stats.monthly_count,
                format_euros(row.stats.avg_upfront),
                format_euros(row.stats.avg_monitoring),
                badges.join(" ")
            );
        }
    }

    if view.record_warnings > 0 {
        println!();
        println!("{} records have malformed fields", view.record_warnings);
    }
}
