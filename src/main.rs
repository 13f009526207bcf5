use anyhow::Result;
use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use zabbix_chat_alerts::config::DEFAULT_CONFIG_PATH;
use zabbix_chat_alerts::{AlertForwarder, AppConfig, ForwardError};

#[derive(Parser)]
#[command(name = "zabbix-google-chat")]
#[command(about = "Forward a Zabbix alert to a Google Chat webhook as a threaded card")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print the card JSON instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Webhook name from the [chat] section
    webhook: String,

    /// '#' separated alert message
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    if let Err(e) = run(&args).await {
        error!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(args: &Args) -> Result<(), ForwardError> {
    let config = AppConfig::from_file(&args.config)?;
    config.webhook_url(&args.webhook)?;
    let forwarder = AlertForwarder::new(config)?;

    if args.dry_run {
        let card = forwarder.render(&args.message, Local::now().date_naive())?;
        let json = serde_json::to_string_pretty(&card)?;
        println!("{}", json);
        return Ok(());
    }

    let outcome = forwarder.forward(&args.webhook, &args.message).await?;
    info!(
        "✅ Trigger {} -> {}{}",
        outcome.trigger_id,
        outcome.thread,
        if outcome.replied { " (reply)" } else { "" }
    );

    Ok(())
}
