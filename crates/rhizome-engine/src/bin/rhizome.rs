//! Rhizome index entry point: build the link-graph index for a corpus
//! and print each document's linked references.

use rhizome_core::SiteConfig;
use rhizome_engine::IndexService;

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut config = load_config();
    if let Some(root) = std::env::args().nth(1) {
        config.content.root = root.into();
    }

    eprintln!("🚀 Indexing corpus at {:?}", config.content.root);

    let service = IndexService::new(config);
    service.init().await;

    let documents = service.documents().await;
    eprintln!("✅ {} documents indexed", documents.len());

    for doc in &documents {
        let refs = service.linked_references(doc.id().as_str()).await;
        println!("{}  {}", doc.href(), doc.display_label());
        for linked in refs {
            println!("    <- {}  {}", linked.href, linked.label);
        }
    }

    let info = service.cache_info().await;
    if info.exists {
        eprintln!("💾 Cache snapshot holds {} entries", info.entries);
    }

    service.shutdown().await;
}

/// `rhizome.yaml` in the working directory, or defaults.
fn load_config() -> SiteConfig {
    match std::fs::read_to_string("rhizome.yaml") {
        Ok(text) => match SiteConfig::from_yaml(&text) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("❌ Invalid rhizome.yaml, using defaults: {}", err);
                SiteConfig::default()
            }
        },
        Err(_) => SiteConfig::default(),
    }
}
