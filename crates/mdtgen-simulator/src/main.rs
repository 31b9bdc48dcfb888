//! CLI entry point for the MDT telemetry generator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mdtgen_simulator::{
    config::{ConfigSource, GeneratorConfig},
    generator::{Generator, RunOptions},
    transport::DialoutStream,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "mdtgen")]
#[command(about = "Synthetic Cisco NX-OS MDT dial-out telemetry generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream telemetry to a collector
    Run {
        /// Collector address (host:port)
        #[arg(short, long, default_value = "10.10.20.10:57500")]
        server: String,

        /// Node identifier reported in every message
        #[arg(short, long, default_value = "leaf-101")]
        node: String,

        /// Tick interval in seconds
        #[arg(short, long, default_value = "5")]
        interval: u64,

        /// Chance of a BGP neighbor flap per tick (0.0-1.0)
        #[arg(long, default_value = "0.02")]
        flap_chance: f64,

        /// Configuration file; defaults are used if it does not exist
        #[arg(short, long, default_value = "config/generator.yaml")]
        config: PathBuf,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Connection timeout in seconds
        #[arg(long, default_value = "10")]
        connect_timeout: u64,
    },

    /// Load and validate a configuration file
    Validate {
        #[arg(short, long, default_value = "config/generator.yaml")]
        config: PathBuf,
    },

    /// Write the default configuration as YAML
    InitConfig {
        #[arg(short, long, default_value = "config/generator.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    mdtgen_simulator::logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            server,
            node,
            interval,
            flap_chance,
            config,
            seed,
            max_ticks,
            connect_timeout,
        } => {
            let options = RunOptions {
                node_id: node,
                interval: Duration::from_secs(interval),
                flap_chance,
                seed,
                max_ticks,
            };
            run(
                &server,
                &config,
                options,
                Duration::from_secs(connect_timeout),
            )
            .await
        }
        Commands::Validate { config } => validate(&config),
        Commands::InitConfig { output, force } => init_config(&output, force),
    }
}

async fn run(
    server: &str,
    config_path: &Path,
    options: RunOptions,
    connect_timeout: Duration,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut generator = Generator::new(&config, options, chrono::Utc::now())
        .context("Invalid run options")?;

    info!("Connecting to MDT collector at {} ...", server);
    let mut stream = DialoutStream::connect(server, connect_timeout)
        .await
        .with_context(|| format!("Failed to open dial-out stream to {}", server))?;
    info!("MDT dial-out stream established");

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    match generator.run(&mut stream, shutdown).await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Failed to send MdtDialoutArgs: {}", e);
            Err(e.into())
        }
    }
}

fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let (config, source) = GeneratorConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    match source {
        ConfigSource::File(p) => info!("Loaded configuration from: {}", p.display()),
        ConfigSource::Defaults => info!(
            "Config file {} not found, using built-in defaults",
            path.display()
        ),
    }
    Ok(config)
}

fn validate(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let counters = &config.simulation.counters;

    println!("Configuration OK");
    println!(
        "  VXLAN: {} (VNI {}), ingress +[{}, {}), egress +[{}, {})",
        config.vxlan.interface_name,
        config.vxlan.vni_id,
        counters.vxlan_ingress_min,
        counters.vxlan_ingress_max,
        counters.vxlan_egress_min,
        counters.vxlan_egress_max
    );
    println!(
        "  BGP neighbors: {}, recovery {}-{}s",
        config.bgp_neighbors.len(),
        config.simulation.flap_recovery_min,
        config.simulation.flap_recovery_max
    );
    println!(
        "  EVPN routes: type2={} type3={} type5={}",
        config.evpn.type2_routes, config.evpn.type3_routes, config.evpn.type5_routes
    );
    println!("  VNIs: {}", config.vni_states.len());
    Ok(())
}

fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            output.display()
        );
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    GeneratorConfig::write_default(output)?;
    info!("Wrote default configuration to {}", output.display());
    Ok(())
}

/// Cancels `shutdown` on SIGINT or SIGTERM.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("SIGINT received, shutting down gracefully...");
            }
            _ = terminate => {
                info!("SIGTERM received, shutting down gracefully...");
            }
        }

        shutdown.cancel();
    });
}
