use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use host_proxy::client::{EndpointResolver, Selection};
use host_proxy::config::AgentConfig;
use host_proxy::logging::{self, LogOutput};
use host_proxy::server::{ServerAggregator, agent};
use host_proxy::version::ApiVersion;

#[derive(Parser)]
#[command(name = "host-proxy")]
#[command(version, about = "Privileged host agent serving versioned operation groups")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve every registered group on its endpoints until one stops
    Serve,
    /// Print the address of the first usable endpoint for a group
    Resolve {
        group: String,
        /// Acceptable versions, most preferred first
        #[arg(required = true, value_parser = parse_version)]
        versions: Vec<ApiVersion>,
        /// Pick the first endpoint that does not exist, like older clients did
        #[arg(long)]
        legacy_polarity: bool,
    },
}

fn parse_version(raw: &str) -> Result<ApiVersion, String> {
    ApiVersion::parse(raw).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };

    match cli.command {
        Command::Serve => {
            let output = LogOutput::Directory(config.log.directory_or_default());
            let _guard = logging::init(&config.log.level, output)?;
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(serve(config))
        }
        Command::Resolve {
            group,
            versions,
            legacy_polarity,
        } => {
            let _guard = logging::init(&config.log.level, LogOutput::Stderr)?;
            let selection = if legacy_polarity {
                Selection::FirstUnreachable
            } else {
                Selection::FirstReachable
            };
            let address = EndpointResolver::new(config.namespace())
                .selection(selection)
                .find_first_endpoint(&group, &versions)?;
            println!("{address}");
            Ok(())
        }
    }
}

async fn serve(config: AgentConfig) -> anyhow::Result<()> {
    let served: Vec<(&str, ApiVersion)> = agent::VERSIONS
        .iter()
        .map(|version| (agent::GROUP, ApiVersion::must(version)))
        .collect();
    let catalog = Arc::new(agent::catalog(&served));
    let aggregator = Arc::new(ServerAggregator::with_namespace(
        config.namespace(),
        agent::group_versions(catalog),
    ));

    tokio::spawn({
        let aggregator = aggregator.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping endpoints");
                if let Err(e) = aggregator.stop() {
                    error!("Failed to stop endpoints: {}", e);
                }
            }
        }
    });

    let addresses = aggregator.addresses();
    aggregator
        .start_with(move || {
            for address in &addresses {
                info!("Listening on {}", address);
            }
        })
        .await?;

    Ok(())
}
