mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, orders::OrdersSubcommand, vehicle::VehicleSubcommand};
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "parkpass",
    about = "Request parking passes from short free-text messages",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ~/.parkpass/config.yaml)
    #[arg(long, global = true, env = "PARKPASS_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database (default: `database` from config, else ~/.parkpass/parkpass.db)
    #[arg(long, global = true, env = "PARKPASS_DB")]
    db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the vehicle registry
    Vehicle {
        #[command(subcommand)]
        subcommand: VehicleSubcommand,
    },

    /// Show how a message would be understood, without submitting it
    Parse {
        /// Message text, e.g. `секвойя завтра 15:30`
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Parse a message, submit the pass request and record the attempt
    Request {
        /// Message text, e.g. `панама 18:45`
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Vehicle to use when the message names none (overrides default_vehicle)
        #[arg(long)]
        vehicle: Option<String>,
    },

    /// Show recorded pass requests
    Orders {
        #[command(subcommand)]
        subcommand: OrdersSubcommand,
    },

    /// Check that the parking site answers
    Check,

    /// Interactive bot session over stdin/stdout
    Chat {
        /// User id the messages are attributed to
        #[arg(long, default_value = "0")]
        user: i64,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Chat { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = Context::resolve(cli.config.as_deref(), cli.db.as_deref()).and_then(|ctx| {
        match cli.command {
            Commands::Vehicle { subcommand } => cmd::vehicle::run(&ctx, subcommand, cli.json),
            Commands::Parse { text } => cmd::parse::run(&ctx, &text.join(" "), cli.json),
            Commands::Request { text, vehicle } => {
                cmd::request::run(&ctx, &text.join(" "), vehicle.as_deref(), cli.json)
            }
            Commands::Orders { subcommand } => cmd::orders::run(&ctx, subcommand, cli.json),
            Commands::Check => cmd::check::run(&ctx, cli.json),
            Commands::Chat { user } => cmd::chat::run(&ctx, user),
            Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand, cli.json),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
