use std::time::{Duration, SystemTime};

use log::{debug, info, warn};
use tokio::sync::{RwLock, RwLockReadGuard};

use rhizome_core::model::content_href;
use rhizome_core::{
    BackLink, CacheSnapshot, DocumentMetadata, IndexBuilder, LinkIndex, LinkedReference,
    SiteConfig,
};

use crate::scanner::CorpusScanner;
use crate::store::CacheStore;

/// Diagnostic view of the persisted cache.
#[derive(Debug, Clone)]
pub struct CacheInfo {
    pub exists: bool,
    pub entries: usize,
    pub built_at: Option<SystemTime>,
    pub age: Option<Duration>,
}

/// Query surface over the lazily-built link index.
///
/// An explicit instance owning its state: construct one per process,
/// share it by reference. The index is built on `init` or on the first
/// query, whichever comes first, and held until `clear_cache`. First
/// queries racing before initialization serialize on the state write
/// lock, so the corpus is only ever built once per lifecycle.
///
/// Every failure mode degrades to an empty index or an unresolved
/// lookup; no query returns an error.
pub struct IndexService {
    config: SiteConfig,
    scanner: CorpusScanner,
    store: CacheStore,
    builder: IndexBuilder,
    state: RwLock<Option<LinkIndex>>,
}

impl IndexService {
    pub fn new(config: SiteConfig) -> Self {
        let scanner = CorpusScanner::from_config(&config);
        let store = CacheStore::from_config(&config);
        let builder = IndexBuilder::new(&config.content.extension);
        Self {
            config,
            scanner,
            store,
            builder,
            state: RwLock::new(None),
        }
    }

    /// Eagerly build or load the index.
    pub async fn init(&self) {
        self.ensure().await;
    }

    /// Resolve a reference token to its canonical slug.
    pub async fn resolve_reference(&self, token: &str) -> Option<String> {
        let guard = self.ensure().await;
        guard.as_ref().and_then(|index| index.resolve_slug(token))
    }

    /// Resolve a reference token to its canonical content href.
    pub async fn resolve_href(&self, token: &str) -> Option<String> {
        self.resolve_reference(token)
            .await
            .map(|slug| content_href(&slug))
    }

    /// Ordered backlinks for a document key. Empty when the key is
    /// unknown or nothing refers to it.
    pub async fn backlinks_of(&self, key: &str) -> Vec<BackLink> {
        let guard = self.ensure().await;
        guard
            .as_ref()
            .map(|index| index.backlinks_of(key).to_vec())
            .unwrap_or_default()
    }

    /// Backlinks as `{href, label}` pairs for a "Linked References"
    /// section.
    pub async fn linked_references(&self, key: &str) -> Vec<LinkedReference> {
        let guard = self.ensure().await;
        guard
            .as_ref()
            .map(|index| index.linked_references(key))
            .unwrap_or_default()
    }

    /// All document metadata, newest first.
    pub async fn documents(&self) -> Vec<DocumentMetadata> {
        let guard = self.ensure().await;
        guard
            .as_ref()
            .map(|index| index.documents().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop the in-memory index and the persisted snapshot; the next
    /// query rebuilds and re-persists.
    pub async fn clear_cache(&self) {
        let mut guard = self.state.write().await;
        *guard = None;
        self.store.clear();
    }

    /// Persist the current index before the process exits. Best-effort.
    pub async fn shutdown(&self) {
        if !self.config.cache.enabled {
            return;
        }
        let guard = self.state.read().await;
        if let Some(index) = guard.as_ref() {
            self.persist(index);
        }
    }

    /// Diagnostic snapshot of the persisted cache.
    pub async fn cache_info(&self) -> CacheInfo {
        match self.store.load() {
            Ok(Some(snapshot)) => {
                let built_at = snapshot.built_at_time();
                CacheInfo {
                    exists: true,
                    entries: snapshot.entries.len(),
                    built_at: Some(built_at),
                    age: SystemTime::now().duration_since(built_at).ok(),
                }
            }
            _ => CacheInfo {
                exists: false,
                entries: 0,
                built_at: None,
                age: None,
            },
        }
    }

    /// Read-lock the state, initializing it first if this is the first
    /// query of the lifecycle.
    async fn ensure(&self) -> RwLockReadGuard<'_, Option<LinkIndex>> {
        {
            let guard = self.state.read().await;
            if guard.is_some() {
                return guard;
            }
        }
        {
            let mut guard = self.state.write().await;
            // Double-checked: a racing first query may have built already.
            if guard.is_none() {
                *guard = Some(self.build_or_load().await);
            }
        }
        self.state.read().await
    }

    /// Serve the snapshot when it is fresh, rebuild otherwise. Never
    /// fails: any unrecoverable condition degrades to an empty index.
    async fn build_or_load(&self) -> LinkIndex {
        let extension = &self.config.content.extension;

        let entries = match self.scanner.list_entries() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("serving empty index: {}", err);
                return LinkIndex::empty(extension);
            }
        };

        if self.config.cache.enabled {
            match self.store.load() {
                Ok(Some(snapshot)) if !self.store.is_stale(&snapshot, &entries) => {
                    debug!(
                        "cache snapshot {:?} is fresh; skipping content reads",
                        self.store.path()
                    );
                    let built_at = snapshot.built_at_time();
                    let mut index = self.builder.build_metadata(&entries);
                    index.install_backlinks(snapshot.into_backlinks(), built_at);
                    return index;
                }
                Ok(Some(_)) => debug!("cache snapshot is stale; rebuilding"),
                Ok(None) => debug!("no cache snapshot; building"),
                Err(err) => warn!("rebuilding: {}", err),
            }
        }

        let documents = match self.scanner.scan().await {
            Ok(documents) => documents,
            Err(err) => {
                warn!("serving empty index: {}", err);
                return LinkIndex::empty(extension);
            }
        };

        let (index, stats) = self.builder.build(&documents);

        for link in &stats.unresolved {
            warn!(
                "could not resolve reference {:?} in {}",
                link.target_token, link.source
            );
        }
        if self.config.logging.show_index_stats {
            info!(
                "indexed {} documents ({} structured, {} fallback): {} links, {} resolved, {} unresolved",
                stats.total_files,
                stats.structured,
                stats.fallback,
                stats.links_found,
                stats.resolved,
                stats.unresolved.len()
            );
        }

        if self.config.cache.enabled {
            self.persist(&index);
        }
        index
    }

    fn persist(&self, index: &LinkIndex) {
        let snapshot = CacheSnapshot::from_index(index);
        if let Err(err) = self.store.save(&snapshot) {
            warn!(
                "failed to write cache snapshot {:?}: {}",
                self.store.path(),
                err
            );
        }
    }
}
