//! Civo provider - reconciles Civo cloud resources declared in Kubernetes
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use civo_provider::{apis, controller, CivoConnector, Defaults};

/// Kubernetes provider for Civo clusters, instances, networks and storage
#[derive(Parser, Debug)]
#[command(name = "civo-provider", version, about, long_about = None)]
struct Cli {
    /// Interval at which every resource is reconciled once it is available
    #[arg(long, env = "SYNC_PERIOD", default_value = "1h", value_parser = parse_duration)]
    sync_period: Duration,

    /// Interval at which resources are checked while they converge
    #[arg(long, env = "POLL_INTERVAL", default_value = "1m", value_parser = parse_duration)]
    poll_interval: Duration,

    /// Maximum number of resources of one kind reconciled at once
    #[arg(long, env = "MAX_RECONCILE_RATE", default_value_t = 10)]
    max_reconcile_rate: u16,

    /// Log at debug level
    #[arg(long, short, env = "DEBUG")]
    debug: bool,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Kubernetes version of clusters that do not set one
    #[arg(long, env = "DEFAULT_KUBERNETES_VERSION", default_value = "1.28.7-k3s1")]
    default_kubernetes_version: String,

    /// CNI plugin of clusters that do not set one
    #[arg(long, env = "DEFAULT_CNI", default_value = "flannel")]
    default_cni: String,

    /// Tags added to every new cluster
    #[arg(long, env = "DEFAULT_CLUSTER_TAGS", value_delimiter = ',')]
    default_cluster_tags: Vec<String>,

    /// Civo API endpoint used by provider configs that do not set one
    #[arg(long, env = "CIVO_API_URL")]
    api_url: Option<String>,

    /// Do not publish Kubernetes events
    #[arg(long)]
    no_events: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile resources until terminated (default)
    Run,
    /// Print the custom resource definitions as YAML and exit
    Crds,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    let duration: jiff::SignedDuration = s.parse().map_err(|e| format!("invalid duration {s:?}: {e}"))?;
    Duration::try_from(duration).map_err(|e| format!("invalid duration {s:?}: {e}"))
}

fn init_tracing(cli: &Cli) {
    let default = if cli.debug { "debug,kube=info" } else { "info,kube=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Crds) = cli.command {
        let docs = apis::crds()
            .iter()
            .map(serde_yaml::to_string)
            .collect::<Result<Vec<_>, _>>()
            .context("cannot serialize crds")?;
        println!("{}", docs.join("---\n"));
        return Ok(());
    }

    init_tracing(&cli);
    let client = kube::Client::try_default()
        .await
        .context("cannot create kubernetes client")?;

    let defaults = Defaults {
        kubernetes_version: cli.default_kubernetes_version,
        cni_plugin: cli.default_cni,
        cluster_tags: cli.default_cluster_tags,
    };
    let mut connector = CivoConnector::new(client.clone(), defaults);
    if let Some(url) = cli.api_url {
        connector = connector.with_api_url(url);
    }
    let config = civo_runtime::Config {
        poll_interval: cli.poll_interval,
        sync_period: cli.sync_period,
        concurrency: cli.max_reconcile_rate,
    };

    info!(version = env!("CARGO_PKG_VERSION"), "starting civo provider");
    controller::run_all(client, connector, config, !cli.no_events).await;
    info!("civo provider stopped");
    Ok(())
}
