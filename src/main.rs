/// kresources - Kubernetes manifests as generic resources
///
/// Loads YAML manifests and reads, creates, updates or deletes the resources
/// they declare on a live cluster.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kresources::clusters::{self, ClusterResource, KubeClusterClient};
use kresources::{ClientConfig, Resource};

#[derive(Parser)]
#[command(name = "kresources")]
#[command(about = "Load Kubernetes manifests and manage their resources on a cluster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Client configuration file path
    #[arg(short, long, default_value = "kresources.yaml")]
    config: PathBuf,

    /// Kubeconfig file (overrides the configuration file)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context (overrides the configuration file)
    #[arg(long)]
    context: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resources declared in manifest files
    Show {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the live cluster state of the resources declared in manifest files
    Get {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Create the resources declared in manifest files
    Create {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Overwrite the cluster copies of the resources declared in manifest files
    Update {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete the resources declared in manifest files
    Delete {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Generate example configuration file
    Init,
}

#[derive(Clone, Copy)]
enum Action {
    Create,
    Update,
    Delete,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kresources={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Execute command
    let result = match &cli.command {
        Commands::Show { files } => show_resources(files),
        Commands::Get { files } => get_resources(&cli, files).await,
        Commands::Create { files } => apply_action(&cli, files, Action::Create).await,
        Commands::Update { files } => apply_action(&cli, files, Action::Update).await,
        Commands::Delete { files } => apply_action(&cli, files, Action::Delete).await,
        Commands::Init => init_config(&cli).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Build the cluster client from the configuration file and flags
async fn connect(cli: &Cli) -> Result<KubeClusterClient> {
    let config = ClientConfig::load_or_default(&cli.config)
        .context("Failed to load configuration")?
        .with_overrides(cli.kubeconfig.clone(), cli.context.clone());

    clusters::connect(&config)
        .await
        .context("Failed to connect to cluster")
}

/// Print resources as a multi-document YAML stream
fn print_resources(resources: &[Resource]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for resource in resources {
        let yaml = serde_yaml::to_string(resource).context("Failed to render resource")?;
        write!(out, "---\n{}", yaml)?;
    }

    Ok(())
}

fn show_resources(files: &[PathBuf]) -> Result<()> {
    let resources = kresources::from_files(files).context("Failed to load manifests")?;
    print_resources(&resources)
}

async fn get_resources(cli: &Cli, files: &[PathBuf]) -> Result<()> {
    let client = connect(cli).await?;

    let resources = kresources::from_cluster(&client, files)
        .await
        .context("Failed to read resources from cluster")?;

    print_resources(&resources)
}

/// Run one operation for every declared resource, in order
async fn apply_action(cli: &Cli, files: &[PathBuf], action: Action) -> Result<()> {
    let resources = kresources::from_files(files).context("Failed to load manifests")?;
    let client = connect(cli).await?;

    for resource in resources {
        let label = format!("{}/{}", resource.kind(), resource.name());
        let mut handle = ClusterResource::from_resource(&client, resource)
            .with_context(|| format!("Invalid resource {}", label))?;

        let outcome = match action {
            Action::Create => handle.create().await,
            Action::Update => handle.update().await,
            Action::Delete => handle.delete().await,
        };
        outcome.with_context(|| format!("Failed to process {}", label))?;

        match action {
            Action::Create => info!("✓ {} created", label),
            Action::Update => info!("✓ {} updated", label),
            Action::Delete => info!("✓ {} deleted", label),
        }
    }

    Ok(())
}

/// Generate example configuration file
async fn init_config(cli: &Cli) -> Result<()> {
    if cli.config.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            cli.config.display()
        );
    }

    let example_config = ClientConfig::example();
    let yaml = serde_yaml::to_string(&example_config)?;

    tokio::fs::write(&cli.config, yaml)
        .await
        .context("Failed to write configuration file")?;

    info!("Example configuration created: {}", cli.config.display());
    info!("");
    info!("Next steps:");
    info!("  1. Point kubeconfig and context at your cluster");
    info!("  2. Check what your manifests declare:");
    info!("     kresources show manifests/*.yaml");
    info!("  3. Create the resources:");
    info!("     kresources create manifests/*.yaml");

    Ok(())
}
