//! `k8s-vuln-harvester` - converts the official Kubernetes CVE feed into OSV
//! records, one `{cve_id}.json` per vulnerability under `<vuln-list-dir>/vulns`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use k8s_vuln_harvester::config::{DEFAULT_FEED_URL, DEFAULT_REGISTRY_URL, DEFAULT_VULN_LIST_DIR};
use k8s_vuln_harvester::telemetry::init_tracing;
use k8s_vuln_harvester::{HarvesterConfig, HarvesterExecutor};

#[derive(Parser)]
#[command(name = "k8s-vuln-harvester")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kubernetes CVE feed to OSV harvester", long_about = None)]
struct Cli {
    /// vuln-list dir
    #[arg(long, env = "VULN_LIST_DIR", default_value = DEFAULT_VULN_LIST_DIR)]
    vuln_list_dir: PathBuf,

    /// CVE registry API base URL
    #[arg(long, env = "CVE_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL)]
    registry_url: String,

    /// Kubernetes CVE feed URL
    #[arg(long, env = "K8S_CVE_FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = HarvesterConfig::default()
        .with_vuln_list_dir(cli.vuln_list_dir)
        .with_registry_url(cli.registry_url)
        .with_feed_url(cli.feed_url);

    let executor = HarvesterExecutor::from_config(config).context("error in k8s update")?;
    executor.update().await.context("error in k8s update")?;

    Ok(())
}
