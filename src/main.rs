use clap::Parser;
use trade_tape::cli::{Cli, Commands};
use trade_tape::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    let _telemetry = trade_tape::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.url);
            println!("  Coins: {}", config.feed.coins.join(", "));
            println!(
                "  Timing: reconnect={}s ping={}s pong={}s close={}s connect={}s",
                config.feed.reconnect_delay_secs,
                config.feed.ping_interval_secs,
                config.feed.pong_timeout_secs,
                config.feed.close_timeout_secs,
                config.feed.connect_timeout_secs
            );
            println!("  Broadcast capacity: {}", config.broadcast.capacity);
            println!(
                "  Telemetry: level={} format={:?} metrics_port={:?}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
