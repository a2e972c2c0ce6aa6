//! CLI entry point for the tenantgraph demo.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tenantgraph_core::{Settings, TenantContext, TenantId, TenantLabelConfig, TenantLabelProvider};
use tenantgraph_store::{GraphClient, GraphConfig, GraphStore, MemoryGraphStore, TenantSession};

use tenantgraph_demo::node;
use tenantgraph_demo::scenario::Demo;

#[derive(Parser)]
#[command(name = "tenantgraph-demo")]
#[command(about = "Two customers sharing one graph database through tenant labels")]
struct Cli {
    /// Use the in-process store instead of Neo4j.
    #[arg(long)]
    embedded: bool,

    /// Also save and query for two customers concurrently.
    #[arg(long)]
    concurrent: bool,

    /// Config file prefix (default: tenantgraph).
    #[arg(short, long, default_value = "tenantgraph")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;

    let store: Arc<dyn GraphStore> = if cli.embedded {
        tracing::info!("Using in-process graph store");
        Arc::new(MemoryGraphStore::new())
    } else {
        let graph_config = GraphConfig::from(&settings.neo4j);
        Arc::new(GraphClient::connect(&graph_config).await?)
    };

    let context = TenantContext::new();
    let provider_config = &settings.tenancy.tenant_label_provider;
    if let TenantLabelConfig::Dynamic {
        initial: Some(initial),
    } = provider_config
    {
        context.set(TenantId::parse(initial.clone())?);
    }
    let provider =
        TenantLabelProvider::from_config(provider_config, Some(Arc::new(context.clone())))?;
    tracing::info!(provider = ?provider, "Tenant label provider ready");

    let session = TenantSession::new(
        store.clone(),
        Arc::new(provider),
        Arc::new(node::registry()),
    );
    let mut demo = Demo::new(store, session, context, std::io::stdout().lock());

    demo.run().await?;
    if cli.concurrent {
        demo.run_concurrent().await?;
    }

    Ok(())
}
