//! The demo script.

use std::io::Write;
use std::sync::Arc;

use tenantgraph_core::{AttributeValue, Attributes, LabelSet, StoredNode, TenantContext, TenantId};
use tenantgraph_store::{GraphStore, NodeEntity, TenantSession};

use crate::error::Result;
use crate::node::ConfigurationNode;

/// What the store held and what the session returned at one point.
#[derive(Debug, Clone)]
pub struct GraphView {
    pub tenant: Option<TenantId>,
    pub raw: Vec<StoredNode>,
    pub mapped: Vec<ConfigurationNode>,
}

impl GraphView {
    pub fn mapped_values(&self) -> Vec<&str> {
        self.mapped.iter().map(ConfigurationNode::value).collect()
    }
}

pub struct Demo<W> {
    store: Arc<dyn GraphStore>,
    session: TenantSession,
    context: TenantContext,
    out: W,
}

impl<W: Write> Demo<W> {
    pub fn new(
        store: Arc<dyn GraphStore>,
        session: TenantSession,
        context: TenantContext,
        out: W,
    ) -> Self {
        Self {
            store,
            session,
            context,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Clear the store, add one untenanted node, then save one node per
    /// customer, printing both views after every step.
    pub async fn run(&mut self) -> Result<Vec<GraphView>> {
        let mut views = Vec::new();

        self.session.clear_all().await?;
        self.create_raw_node("some config").await?;
        views.push(self.print_graph().await?);

        self.switch_customer("Customer1")?;
        self.save("OGM-Config-1").await?;
        views.push(self.print_graph().await?);

        self.switch_customer("Customer2")?;
        self.save("OGM-Config-2").await?;
        views.push(self.print_graph().await?);

        self.switch_customer("Customer1")?;
        views.push(self.print_graph().await?);

        Ok(views)
    }

    /// Save and read back for two customers at once, each in its own
    /// task-scoped tenant.
    pub async fn run_concurrent(&mut self) -> Result<Vec<(TenantId, Vec<String>)>> {
        writeln!(self.out, "\nConcurrent customers")?;

        let mut handles = Vec::new();
        for name in ["Customer1", "Customer2"] {
            let tenant = TenantId::parse(name)?;
            let session = self.session.clone();
            let task_tenant = tenant.clone();
            handles.push(tokio::spawn(TenantContext::scope(tenant, async move {
                let mut node = ConfigurationNode::new(format!("Parallel-{task_tenant}"));
                session.save(&mut node).await?;
                let found = session.find_all::<ConfigurationNode>()?.fetch().await?;
                Ok::<_, tenantgraph_core::TenancyError>((
                    task_tenant,
                    found.into_iter().map(|n| n.value().to_string()).collect::<Vec<_>>(),
                ))
            })));
        }

        let mut results = Vec::new();
        for handle in handles {
            let (tenant, values) = handle
                .await
                .map_err(|e| std::io::Error::other(format!("demo task failed: {e}")))??;
            writeln!(self.out, "\t{tenant} sees {values:?}")?;
            results.push((tenant, values));
        }
        Ok(results)
    }

    fn switch_customer(&mut self, customer: &str) -> Result<()> {
        writeln!(self.out, "Switching customer to: {customer}")?;
        self.context.set(TenantId::parse(customer)?);
        Ok(())
    }

    async fn save(&mut self, value: &str) -> Result<()> {
        let mut node = ConfigurationNode::new(value);
        let stored = self.session.save(&mut node).await?;
        writeln!(self.out, "Session saved {node} with labels {}", stored.labels)?;
        Ok(())
    }

    /// Write a node straight to the store, outside any tenant.
    async fn create_raw_node(&mut self, value: &str) -> Result<()> {
        let labels = LabelSet::new().with(ConfigurationNode::TYPE_NAME);
        let attributes = Attributes::from([("value".to_string(), AttributeValue::from(value))]);
        self.store.create_node(&labels, &attributes).await?;
        writeln!(self.out, "Raw store saved a node")?;
        Ok(())
    }

    async fn print_graph(&mut self) -> Result<GraphView> {
        let raw = self.store.match_nodes(&LabelSet::new()).await?;
        writeln!(self.out, "\nRaw store")?;
        for node in &raw {
            writeln!(self.out, "\tNode identity: {}", node.identity)?;
            writeln!(self.out, "\twith labels: {}", node.labels)?;
        }

        let tenant = self.session.provider().tenant().ok();
        writeln!(self.out, "\nTenant session")?;
        let mapped = match &tenant {
            Some(_) => self.session.find_all::<ConfigurationNode>()?.fetch().await?,
            None => Vec::new(),
        };
        let listing: Vec<String> = mapped.iter().map(ToString::to_string).collect();
        writeln!(self.out, "\t[{}]\n", listing.join(", "))?;

        Ok(GraphView {
            tenant,
            raw,
            mapped,
        })
    }
}
