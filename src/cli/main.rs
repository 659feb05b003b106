use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use product_search::{
    backend::ElasticsearchBackend, config::Config, indexer::IndexLifecycleManager,
};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "product-search-cli")]
#[command(about = "Product search CLI", version, long_about = None)]
struct Cli {
    /// Base URL of the product search server
    #[arg(short, long, env = "PRODUCT_SEARCH_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the product index directly against the configured backend
    Rebuild {
        /// Alias to rebuild (defaults to index.alias)
        #[arg(short, long)]
        alias: Option<String>,

        /// Generations to keep (defaults to index.retention_count)
        #[arg(short, long)]
        retention: Option<usize>,
    },

    /// Search products through the HTTP API
    Search {
        #[arg(value_name = "TEXT")]
        text: String,

        #[arg(short, long, default_value = "0")]
        page: usize,

        #[arg(short = 's', long, default_value = "10")]
        page_size: usize,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_search=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = Client::new();

    match cli.command {
        Commands::Rebuild { alias, retention } => {
            let config = Config::load().context("Failed to load configuration")?;
            let backend = ElasticsearchBackend::new(&config.backend)
                .context("Failed to create search backend")?;
            let alias = alias.unwrap_or_else(|| config.index.alias.clone());
            let retention = retention.unwrap_or(config.index.retention_count);

            let manager = IndexLifecycleManager::new(Arc::new(backend), config.index);
            let report = manager
                .rebuild(&alias, retention)
                .await
                .with_context(|| format!("Rebuild of {} failed", alias))?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Search {
            text,
            page,
            page_size,
        } => {
            let response = client
                .post(format!("{}/v1/product", cli.endpoint))
                .json(&json!({
                    "textQuery": text,
                    "page": page,
                    "pageSize": page_size,
                }))
                .send()
                .await
                .context("Search request failed")?;

            let status = response.status();
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            if !status.is_success() {
                bail!("Search returned {}", status);
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health/ready", cli.endpoint))
                .send()
                .await
                .context("Health request failed")?;

            let status = response.status();
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            if !status.is_success() {
                bail!("Server is not ready ({})", status);
            }
        }
    }

    Ok(())
}
