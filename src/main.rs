use clap::{Parser, Subcommand};
use signalbot::{bot::Bot, commands, config, traits::Transport};
use signalbot_transport::SignalApi;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(
    name = "signalbot",
    version,
    about = "Chat-bot framework for Signal, built on signal-cli-rest-api"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot with the demo commands.
    Start,
    /// Check service health, version and group membership.
    Status,
    /// List the groups the account is a member of.
    Groups {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _guard = init_logging(&cfg.bot);

    match cli.command {
        Commands::Start => {
            cfg.validate()?;
            let api = Arc::new(SignalApi::from_config(&cfg.signal));
            let storage = signalbot_storage::build(&cfg.storage).await?;

            println!("{} starting for {}", cfg.bot.name, cfg.signal.phone_number);
            let bot = Bot::new(cfg, api, storage);
            commands::register_defaults(&bot).await?;
            bot.run().await?;
        }
        Commands::Status => {
            println!("{} status check\n", cfg.bot.name);
            println!("Config: {}", cli.config);
            println!("Service: {}", cfg.signal.service);
            println!("Account: {}", cfg.signal.phone_number);
            println!();

            let api = SignalApi::from_config(&cfg.signal);
            if !api.is_available().await {
                println!("  signal-cli-rest-api: unreachable");
                return Ok(());
            }
            println!(
                "  signal-cli-rest-api: available ({})",
                if api.https() { "https" } else { "http" }
            );
            match api.version().await {
                Ok(Some(version)) => println!("  version: {version}"),
                Ok(None) => println!("  version: unknown"),
                Err(e) => println!("  version: error ({e})"),
            }
            match api.list_groups().await {
                Ok(groups) => println!("  groups: {}", groups.len()),
                Err(e) => println!("  groups: error ({e})"),
            }
        }
        Commands::Groups { json } => {
            let api = SignalApi::from_config(&cfg.signal);
            if !api.is_available().await {
                anyhow::bail!("signal-cli-rest-api at {} is unreachable", cfg.signal.service);
            }
            let groups = api.list_groups().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                for group in &groups {
                    println!("{}  {}", group.id, group.name);
                }
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` overrides `bot.log_level`.
/// With `bot.log_file` set, logs go to a daily rolling file instead of stderr.
fn init_logging(bot: &config::BotConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&bot.log_level));

    match bot.log_file.as_deref() {
        Some(path) => {
            let path = config::shellexpand(path);
            let path = std::path::Path::new(&path);
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "signalbot.log".to_string());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
