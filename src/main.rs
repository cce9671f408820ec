use cachedhash::cli::{Cli, Commands};
use cachedhash::types::config::Config;
use cachedhash::CachedHashResult;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> CachedHashResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("cachedhash={}", log_level)
            .parse()
            .unwrap_or_else(|_| "cachedhash=info".parse().expect("fallback directive is valid")),
    );

    let json = config.json_logs();
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            cachedhash::cli::commands::init(path)?;
        }
        Commands::Key { params, material } => {
            cachedhash::cli::commands::key(&params, material);
        }
        Commands::Get { params } => {
            if !cachedhash::cli::commands::get(&params, &config)? {
                eprintln!("miss");
                std::process::exit(1);
            }
        }
        Commands::Run { params, command } => {
            cachedhash::cli::commands::run(&params, &command, &config)?;
        }
        Commands::Remove { params } => {
            cachedhash::cli::commands::remove(&params, &config)?;
        }
        Commands::List => {
            cachedhash::cli::commands::list(&config)?;
        }
        Commands::Version => {
            cachedhash::cli::commands::version();
        }
    }

    Ok(())
}
