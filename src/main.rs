//! Binary entrypoint for the Goosebbs CLI.
//!
//! Commands:
//! - `start [--port <port>]` - run the BBS server
//! - `init` - create a starter `config.toml` and seed the data directory
//! - `status` - print store counts and the configured endpoint
//!
//! See the library crate docs for module-level details: `goosebbs::`.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use goosebbs::bbs::BbsServer;
use goosebbs::config::Config;
use goosebbs::storage::Storage;

#[derive(Parser)]
#[command(name = "goosebbs")]
#[command(about = "A retro terminal BBS served over raw TCP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the BBS server
    Start {
        /// TCP port to listen on (overrides the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Initialize a new BBS configuration and data directory
    Init,
    /// Show BBS status and store counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init, which writes
    // the default config itself)
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start { port } => {
            let mut config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await.with_context(|| {
                    format!("failed to load {} (run `goosebbs init` first)", cli.config)
                })?,
            };
            if let Some(port) = port {
                config.server.port = port;
            }
            info!("Starting Goosebbs v{}", env!("CARGO_PKG_VERSION"));
            let mut bbs = BbsServer::new(config).await?;
            bbs.run().await?;
            info!("Shutting down.");
        }
        Commands::Init => {
            info!("Initializing new BBS configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);

            let config = Config::default();
            let storage = Storage::with_seed(&config.storage.data_dir, &config.bbs.name).await?;
            info!("Seeded stores under {}", storage.base_dir().display());
        }
        Commands::Status => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await.with_context(|| {
                    format!("failed to load {} (run `goosebbs init` first)", cli.config)
                })?,
            };
            let bbs = BbsServer::new(config).await?;
            bbs.show_status().await?;
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured base level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    if let Some(file) = config.as_ref().and_then(|c| c.logging.file.clone()) {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let sink = std::sync::Arc::new(std::sync::Mutex::new(f));

            // When stdout is a terminal, write to both the file and the
            // console; under a service manager only the file gets lines.
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = sink.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)?;
                }
                Ok(())
            });
        }
    }

    let _ = builder.try_init();
}
