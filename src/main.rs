use anyhow::Context;
use aptos_research::{
    api,
    cli::{self, output::Output, Cli, Commands},
    utils::toml_config::{AptosConfig, AptosConfigManager, LogFormat},
    AppState, ConfiguredResearcher, Researcher,
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = Output::from_flag(cli.no_color);

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            provider,
            host,
            port,
        }) => {
            let result = cli::init::run(
                cli::init::InitConfig {
                    path,
                    force,
                    provider,
                    host,
                    port,
                },
                &output,
            );
            match result {
                cli::init::InitResult::Success => Ok(()),
                cli::init::InitResult::AlreadyExists => std::process::exit(1),
                cli::init::InitResult::Error(e) => Err(anyhow::anyhow!(e)),
            }
        }
        Some(Commands::Config { full, validate }) => {
            let config = load_config(&cli.config, &output)?;
            if validate {
                if !cli::config::validate(&config, &output) {
                    std::process::exit(1);
                }
            } else {
                cli::config::show(&config, &cli.config, full, &output);
            }
            Ok(())
        }
        Some(Commands::Ask { question }) => {
            let manager = load_manager(&cli.config, &output)?;
            init_tracing(&manager.config(), cli.verbose);
            ask(manager, &question, &output).await
        }
        Some(Commands::Serve) | None => {
            let manager = load_manager(&cli.config, &output)?;
            init_tracing(&manager.config(), cli.verbose);
            serve(manager).await
        }
    }
}

/// `RUST_LOG` wins over `server.log_level`; `--verbose` wins over both.
fn init_tracing(config: &AptosConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{},tower_http={}",
                config.server.log_level, config.server.log_level
            ))
        })
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn load_config(path: &Path, output: &Output) -> anyhow::Result<AptosConfig> {
    AptosConfig::load(path).map_err(|e| {
        output.error(&e.to_string());
        output.hint("Run 'aptos-research init' to create a configuration");
        anyhow::Error::new(e)
    })
}

fn load_manager(path: &Path, output: &Output) -> anyhow::Result<AptosConfigManager> {
    AptosConfigManager::new(path).map_err(|e| {
        output.error(&e.to_string());
        output.hint("Run 'aptos-research init' to create a configuration");
        anyhow::Error::new(e)
    })
}

async fn ask(manager: AptosConfigManager, question: &str, output: &Output) -> anyhow::Result<()> {
    let researcher = ConfiguredResearcher::new(Arc::new(manager), reqwest::Client::new());

    output.info(&format!("Researching: {}", question));
    let report = researcher
        .research(question)
        .await
        .context("research failed")?;
    output.report(&report);

    Ok(())
}

async fn serve(mut manager: AptosConfigManager) -> anyhow::Result<()> {
    let config = manager.config();

    if config.server.hot_reload {
        manager
            .start_watching()
            .context("failed to watch configuration file")?;
        tracing::info!(path = %manager.config_path().display(), "Configuration hot reload enabled");
    }

    let state = AppState::from_config_manager(Arc::new(manager));
    let app = api::build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        lanes = config.research.lanes.len(),
        policy = ?config.research.policy,
        "Aptos research server listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
