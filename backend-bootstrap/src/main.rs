use anyhow::Result;
use clap::Parser;

use backend_infrastructure::{CliOverrides, CONFIG_PATH_ENV};

#[derive(Parser, Debug)]
#[command(name = "tribewatch")]
#[command(about = "Incoming-attack tracker backend", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// SQLite database path, `:memory:` for a throwaway store
    #[arg(long)]
    db_path: Option<String>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var(CONFIG_PATH_ENV, config);
    }
    let overrides = CliOverrides {
        db_path: args.db_path,
        bind_addr: args.bind,
    };

    backend_bootstrap::run_standalone(&overrides).await
}
