//! The demo script against the in-process store.

use std::sync::Arc;

use tenantgraph_core::{LabelSet, TenantContext, TenantId, TenantLabelProvider};
use tenantgraph_demo::node;
use tenantgraph_demo::scenario::Demo;
use tenantgraph_store::{MemoryGraphStore, TenantSession};

fn tenant(s: &str) -> TenantId {
    TenantId::parse(s).unwrap()
}

fn demo(provider: TenantLabelProvider, context: TenantContext) -> Demo<Vec<u8>> {
    let store = Arc::new(MemoryGraphStore::new());
    let session = TenantSession::new(
        store.clone(),
        Arc::new(provider),
        Arc::new(node::registry()),
    );
    Demo::new(store, session, context, Vec::new())
}

#[tokio::test]
async fn dynamic_provider_switches_customers() {
    let context = TenantContext::new();
    let mut demo = demo(TenantLabelProvider::dynamic(context.clone()), context);
    let views = demo.run().await.unwrap();
    assert_eq!(views.len(), 4);

    // Before any customer is chosen only the raw node exists.
    assert_eq!(views[0].tenant, None);
    assert_eq!(views[0].raw.len(), 1);
    assert_eq!(views[0].raw[0].labels, LabelSet::new().with("ConfigurationNode"));
    assert!(views[0].mapped.is_empty());

    assert_eq!(views[1].tenant, Some(tenant("Customer1")));
    assert_eq!(views[1].mapped_values(), vec!["OGM-Config-1"]);

    assert_eq!(views[2].tenant, Some(tenant("Customer2")));
    assert_eq!(views[2].raw.len(), 3);
    assert_eq!(views[2].mapped_values(), vec!["OGM-Config-2"]);

    assert_eq!(views[3].tenant, Some(tenant("Customer1")));
    assert_eq!(views[3].mapped_values(), vec!["OGM-Config-1"]);

    let labels: Vec<&LabelSet> = views[3].raw.iter().map(|n| &n.labels).collect();
    for customer in ["Customer1", "Customer2"] {
        let expected = LabelSet::new().with("ConfigurationNode").with(customer);
        assert!(labels.contains(&&expected));
    }

    let output = String::from_utf8(demo.into_output()).unwrap();
    assert!(output.contains("Switching customer to: Customer2"));
    assert!(output.contains("with labels: [ConfigurationNode, Customer1]"));
}

#[tokio::test]
async fn static_provider_keeps_one_customer() {
    let context = TenantContext::new();
    let mut demo = demo(TenantLabelProvider::fixed(tenant("Customer1")), context);
    let views = demo.run().await.unwrap();

    // Switching has no effect on labels: both saves land in Customer1.
    assert_eq!(views[0].tenant, Some(tenant("Customer1")));
    assert_eq!(views[3].mapped_values(), vec!["OGM-Config-1", "OGM-Config-2"]);
    assert!(views[3]
        .raw
        .iter()
        .all(|n| !n.labels.contains("Customer2")));
}

#[tokio::test]
async fn concurrent_customers_see_only_their_nodes() {
    let context = TenantContext::new();
    let mut demo = demo(TenantLabelProvider::dynamic(context.clone()), context);
    let results = demo.run_concurrent().await.unwrap();

    assert_eq!(results.len(), 2);
    for (tenant, values) in results {
        assert_eq!(values, vec![format!("Parallel-{tenant}")]);
    }
}
