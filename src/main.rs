use clap::Parser;
use recokit::cli::{Cli, Commands};
use recokit::types::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = Config::load_or_default(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: ignoring {}: {}", cli.config.display(), e);
        Config::default_config()
    });

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("recokit={}", log_level)
            .parse()
            .unwrap_or_else(|_| "recokit=info".parse().expect("fallback directive is valid")),
    );

    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            recokit::cli::commands::init(path)?;
        }
        Commands::Scan {
            source,
            user,
            limit,
            json,
        } => {
            recokit::cli::commands::scan(&source, user, limit, json, &config)?;
        }
        Commands::Score {
            source,
            users,
            items,
            baseline,
        } => {
            recokit::cli::commands::score(&source, &users, &items, baseline, &config)?;
        }
        #[cfg(feature = "sqlite")]
        Commands::Import { input, db } => {
            recokit::cli::commands::import(&input, &db, &config)?;
        }
        Commands::Version => {
            recokit::cli::commands::version();
        }
    }

    Ok(())
}
