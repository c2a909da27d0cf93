//! Rustible IOS - Declarative Cisco IOS resource modules
//!
//! This is the main entry point for the rustible-ios CLI.

mod cli;

use anyhow::Result;
use cli::commands::{self, CommandContext};
use cli::{Cli, Commands};
use rustible_ios::config::{Config, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        if cli.verbosity() >= 1 {
            eprintln!("Warning: Failed to load config: {}", e);
        }
        Config::default()
    });

    // Initialize logging based on verbosity
    init_logging(cli.verbosity(), &config.logging);

    if cli.verbosity() >= 2 {
        eprintln!("rustible-ios v{} by {}", VERSION, AUTHORS);
    }

    let ctx = CommandContext::new(&cli, config);

    let result = match &cli.command {
        Commands::List => commands::list(&ctx),
        Commands::Parse(args) => commands::resource::parse(&ctx, args),
        Commands::Render(args) => commands::resource::render(&ctx, args),
        Commands::Gather(args) => commands::resource::gather(&ctx, args),
        Commands::Diff(args) => commands::resource::diff(&ctx, args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            ctx.output.error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins, then `-v` flags, then the configured level.
fn init_logging(verbosity: u8, logging: &LoggingConfig) {
    let filter = level_for(verbosity, &logging.log_level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(verbosity >= 3)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn level_for(verbosity: u8, configured: &str) -> String {
    match verbosity {
        0 => configured.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
