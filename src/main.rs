use clap::Parser;
use consulta_cnpj::cli::{Cli, Commands};
use consulta_cnpj::types::config::Config;
use consulta_cnpj::ConsultaResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ConsultaResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default_config()
    };

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("consulta_cnpj={}", log_level)
            .parse()
            .unwrap_or_else(|_| "consulta_cnpj=info".parse().expect("fallback directive is valid")),
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
            consulta_cnpj::cli::commands::init(path).await?;
        }
        Commands::Lookup { cnpj, json } => {
            if !consulta_cnpj::cli::commands::lookup(&cnpj, json, &config).await? {
                // A rejeição já foi exibida
                std::process::exit(1);
            }
        }
        Commands::Shell => {
            consulta_cnpj::cli::commands::shell(&config).await?;
        }
        Commands::List { limit } => {
            consulta_cnpj::cli::commands::list(limit, &config)?;
        }
        Commands::Doctor => {
            consulta_cnpj::cli::commands::doctor(&config).await?;
        }
        Commands::Config => {
            consulta_cnpj::cli::commands::config_cmd(&cli.config)?;
        }
        Commands::Version => {
            consulta_cnpj::cli::commands::version();
        }
    }

    Ok(())
}
