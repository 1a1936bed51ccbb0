use clap::Parser;
use dotenv::dotenv;
use minivault::run_with_config_path;

/// MiniVault - lightweight local REST API for prompt generation
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML config file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from `.env` file into std::env (optional)
    dotenv().ok();

    let args = Args::parse();

    // Load config, init logging and run
    run_with_config_path(&args.config).await
}
