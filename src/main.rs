/// Kubetools - kubectl convenience wrapper
///
/// Lists cluster resources, reports usage sorted by cpu, and deletes
/// objects by shelling out to kubectl and reshaping its tabular output.
mod config;
mod kubectl;
mod table;
mod units;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::KubetoolsConfig;
use crate::kubectl::KubectlClient;
use crate::table::{render, Table};

#[derive(Parser)]
#[command(name = "kubetools")]
#[command(about = "Inspect and prune cluster resources via kubectl", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "kubetools.yaml")]
    config: PathBuf,

    /// Namespace override (defaults to the configured namespace)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Table output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned plain text
    Text,
    /// JSON array of row objects
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources of a kind with wide output
    Get {
        /// Resource kind (pod, node, deployment, ...)
        kind: String,
    },

    /// Show resource usage, sorted by cpu descending
    Top {
        /// Resource kind (pod or node)
        kind: String,
    },

    /// Delete a resource
    Delete {
        /// Resource name
        name: String,

        /// Resource kind
        #[arg(long, default_value = "pod")]
        kind: String,

        /// Zero grace period and immediate termination
        #[arg(long)]
        force: bool,

        /// Suppress the confirmation line
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check that kubectl is available
    Check,

    /// Generate example configuration file
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kubetools={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Get { ref kind } => get(&cli, kind).await,
        Commands::Top { ref kind } => top(&cli, kind).await,
        Commands::Delete {
            ref name,
            ref kind,
            force,
            quiet,
        } => delete(&cli, name, kind, force, quiet).await,
        Commands::Check => check(&cli).await,
        Commands::Init => init_config(&cli).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Resolve configuration into a client and the effective namespace
fn setup(cli: &Cli) -> Result<(KubectlClient, String)> {
    let config = KubetoolsConfig::load(&cli.config).context("Failed to load configuration")?;
    let namespace = cli
        .namespace
        .clone()
        .unwrap_or_else(|| config.namespace.clone());
    let client = KubectlClient::new(config.kubectl, config.kubeconfig);
    Ok((client, namespace))
}

fn print_table(cli: &Cli, table: &Table) -> Result<()> {
    match cli.output {
        OutputFormat::Text if table.is_empty() => info!("No resources found"),
        OutputFormat::Text => print!("{}", render::to_text(table)),
        OutputFormat::Json => println!("{}", render::to_json(table)?),
    }
    Ok(())
}

/// List resources of a kind
async fn get(cli: &Cli, kind: &str) -> Result<()> {
    let (client, namespace) = setup(cli)?;
    let table = client.get_all(kind, &namespace).await?;
    print_table(cli, &table)
}

/// Report resource usage
async fn top(cli: &Cli, kind: &str) -> Result<()> {
    let (client, namespace) = setup(cli)?;
    let table = client.top(kind, &namespace).await?;
    print_table(cli, &table)
}

/// Delete a resource
async fn delete(cli: &Cli, name: &str, kind: &str, force: bool, quiet: bool) -> Result<()> {
    let (client, namespace) = setup(cli)?;
    client.delete(name, kind, &namespace, force, !quiet).await
}

/// Check prerequisites
async fn check(cli: &Cli) -> Result<()> {
    let (client, _) = setup(cli)?;
    client
        .check_installed()
        .await
        .context("kubectl is required")?;
    info!("kubectl is available");
    Ok(())
}

/// Initialize example configuration file
async fn init_config(cli: &Cli) -> Result<()> {
    if cli.config.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            cli.config.display()
        );
    }

    let example = KubetoolsConfig::example();
    let yaml = serde_yaml::to_string(&example)?;

    tokio::fs::write(&cli.config, yaml)
        .await
        .context("Failed to write configuration file")?;

    info!("Example configuration created: {}", cli.config.display());
    info!("");
    info!("Next steps:");
    info!("  1. Edit the configuration file to set your default namespace");
    info!("  2. List pods in that namespace:");
    info!("     kubetools get pod");

    Ok(())
}
