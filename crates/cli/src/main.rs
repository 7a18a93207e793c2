use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "puckline")]
#[command(about = "Hockey odds scraping and settlement pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the odds page and merge new fixtures into the odds ledger
    CollectOdds {
        /// League to collect (khl or nhl)
        #[arg(short, long)]
        league: String,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Run the browser session headless
        #[arg(long)]
        headless: bool,
    },
    /// Match pending fixtures against results and settle them
    Reconcile {
        /// League to reconcile (khl or nhl)
        #[arg(short, long)]
        league: String,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Run the browser session headless
        #[arg(long)]
        headless: bool,
    },
    /// Start the control panel API server
    Serve {
        /// Server address
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        addr: String,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Print a ledger view (schedule or results)
    Show {
        /// League to show (khl or nhl)
        #[arg(short, long)]
        league: String,
        /// View to print: schedule (pending) or results (settled)
        #[arg(short, long, default_value = "schedule")]
        view: String,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::CollectOdds {
            league,
            config,
            headless,
        } => {
            commands::run_collect(&league, &config, headless).await?;
        }
        Commands::Reconcile {
            league,
            config,
            headless,
        } => {
            commands::run_reconcile(&league, &config, headless).await?;
        }
        Commands::Serve { addr, config } => {
            commands::run_serve(&addr, &config).await?;
        }
        Commands::Show {
            league,
            view,
            config,
        } => {
            commands::run_show(&league, &view, &config)?;
        }
    }

    Ok(())
}
