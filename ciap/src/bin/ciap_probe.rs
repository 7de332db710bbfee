//! ciap-probe
//!
//! Runs one interaction load against a live API and reports what discovery
//! found: probe results, where the records came from, and headline figures.
//! With `--diagnostics` it reports per-endpoint status instead.
//!
//! Usage:
//!   ciap-probe --base-url http://localhost:8000 [--config ciap.toml] [--json]

use anyhow::Context;
use ciap::config::DiscoveryConfig;
use ciap::{distinct_agents, AnalyticsSummary, InteractionLoader, LoadOutcome};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ciap-probe")]
#[command(about = "Discover and load contact-center interactions from a remote API")]
struct Args {
    /// Base URL of the interaction API (overrides CIAP_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Path to a discovery configuration file (TOML format)
    #[arg(long, env = "CIAP_CONFIG_PATH")]
    config: Option<String>,

    /// Timeout for probe and data requests, in seconds (overrides CIAP_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Probe endpoints concurrently
    #[arg(long, default_value = "false")]
    concurrent: bool,

    /// Report per-endpoint diagnostics instead of loading
    #[arg(long, default_value = "false")]
    diagnostics: bool,

    /// Print machine-readable JSON
    #[arg(long, default_value = "false")]
    json: bool,
}

impl Args {
    /// File (or defaults), then environment, then command-line flags.
    fn discovery_config(&self) -> anyhow::Result<DiscoveryConfig> {
        let base = match &self.config {
            Some(path) => DiscoveryConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path))?,
            None => DiscoveryConfig::default(),
        };
        let mut config = base
            .with_env_overrides()
            .context("applying CIAP_* environment overrides")?;
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
        if self.concurrent {
            config.concurrent_probes = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("ciap=info".parse()?),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.discovery_config()?;
    info!("Target API: {}", config.base_url);
    let loader = InteractionLoader::new(config)?;

    if args.diagnostics {
        let auth = loader.check_auth_requirements().await;
        let results = loader.run_diagnostics().await;
        if args.json {
            let report = serde_json::json!({ "auth": auth, "endpoints": results });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("reachable: {}  auth required: {}", auth.reachable, auth.auth_required);
            for suggestion in &auth.suggestions {
                println!("  hint: {}", suggestion);
            }
            for result in &results {
                println!(
                    "{:<40} {:>5} {:>7}ms  {}",
                    result.endpoint,
                    result.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                    result.response_time_ms,
                    result.error.as_deref().unwrap_or("ok")
                );
            }
        }
        return Ok(());
    }

    let outcome = loader.load_interactions().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }
    Ok(())
}

fn print_summary(outcome: &LoadOutcome) {
    println!("state:    {}", outcome.final_state);
    println!(
        "source:   {}",
        outcome
            .source_endpoint
            .as_deref()
            .unwrap_or("demo data (fallback)")
    );
    for probe in &outcome.probe_results {
        println!(
            "  probe {:<40} {:<10} {:>6} record(s)",
            probe.endpoint, probe.shape, probe.record_count
        );
    }

    let summary = AnalyticsSummary::from_interactions(&outcome.data);
    println!("interactions:         {}", summary.total_interactions);
    println!("sentiment change:     {:+}", summary.avg_sentiment_improvement);
    println!("avg crosstalk:        {}", summary.avg_crosstalk);
    println!("avg mutual silence:   {}", summary.avg_mutual_silence);
    println!("avg positive:         {}", summary.avg_positive_sentiment);
    println!("agents:               {}", distinct_agents(&outcome.data).join(", "));
}
