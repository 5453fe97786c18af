use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::SystemTime;

use log::debug;

use crate::alias::{aliases_for, candidate_keys};
use crate::extract::{extract_filetags, extract_identifier_keyword, extract_links, extract_title};
use crate::filename::{extract_slug_from_filename, parse_filename};
use crate::model::{
    BackLink, CorpusEntry, DocumentId, DocumentMetadata, LinkReference, LinkedReference,
    ScannedDocument,
};

/// Build report, in scan order.
#[derive(Debug, Default, Clone)]
pub struct IndexStats {
    pub total_files: usize,
    pub structured: usize,
    pub fallback: usize,
    pub links_found: usize,
    pub resolved: usize,
    /// References whose target matched no alias. Not an error; the
    /// caller decides how loudly to report them.
    pub unresolved: Vec<LinkReference>,
}

/// The bidirectional link index.
///
/// Forward: every alias a reference could use maps to the canonical
/// document. Reverse: every document maps to the ordered list of
/// documents referring to it.
#[derive(Debug, Clone)]
pub struct LinkIndex {
    aliases: HashMap<String, DocumentId>,
    documents: HashMap<DocumentId, DocumentMetadata>,
    backlinks: HashMap<DocumentId, Vec<BackLink>>,
    extension: String,
    built_at: SystemTime,
}

impl LinkIndex {
    /// An index over nothing. Queries are all safe and empty.
    pub fn empty(extension: &str) -> Self {
        Self {
            aliases: HashMap::new(),
            documents: HashMap::new(),
            backlinks: HashMap::new(),
            extension: extension.to_string(),
            built_at: SystemTime::now(),
        }
    }

    /// Resolve a reference token to its document.
    pub fn resolve(&self, token: &str) -> Option<&DocumentMetadata> {
        candidate_keys(token, &self.extension)
            .iter()
            .find_map(|key| self.aliases.get(key))
            .and_then(|id| self.documents.get(id))
    }

    /// Resolve a reference token to its canonical slug.
    pub fn resolve_slug(&self, token: &str) -> Option<String> {
        self.resolve(token).map(|meta| meta.slug.clone())
    }

    /// Ordered backlinks for a document key (identifier or stem).
    /// Empty for unknown keys, never an error.
    pub fn backlinks_of(&self, key: &str) -> &[BackLink] {
        self.backlinks
            .get(&DocumentId::from_key(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Backlinks as `{href, label}` pairs for a "Linked References" section.
    pub fn linked_references(&self, key: &str) -> Vec<LinkedReference> {
        self.backlinks_of(key)
            .iter()
            .map(|bl| LinkedReference {
                href: bl.href(),
                label: bl.label().to_string(),
            })
            .collect()
    }

    /// All document metadata, newest first by identifier timestamp;
    /// undated documents follow, ordered by slug.
    pub fn documents(&self) -> Vec<&DocumentMetadata> {
        let mut docs: Vec<&DocumentMetadata> = self.documents.values().collect();
        docs.sort_by(|a, b| match (&b.identifier, &a.identifier) {
            (Some(x), Some(y)) => x.cmp(y).then_with(|| a.slug.cmp(&b.slug)),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => a.slug.cmp(&b.slug),
        });
        docs
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of (target, source) backlink edges.
    pub fn backlink_count(&self) -> usize {
        self.backlinks.values().map(Vec::len).sum()
    }

    pub fn built_at(&self) -> SystemTime {
        self.built_at
    }

    pub fn backlinks(&self) -> &HashMap<DocumentId, Vec<BackLink>> {
        &self.backlinks
    }

    /// Replace the reverse side wholesale, keeping the forward side.
    /// Used when a fresh cache snapshot supplies the backlinks and only
    /// the forward table was rebuilt from the file listing.
    pub fn install_backlinks(
        &mut self,
        backlinks: HashMap<DocumentId, Vec<BackLink>>,
        built_at: SystemTime,
    ) {
        self.backlinks = backlinks;
        self.built_at = built_at;
    }
}

/// Two-pass batch builder over the corpus scanner's output.
pub struct IndexBuilder {
    extension: String,
}

impl IndexBuilder {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
        }
    }

    /// Full build: pass 1 registers metadata under every alias, pass 2
    /// resolves extracted links into the reverse index.
    pub fn build(&self, documents: &[ScannedDocument]) -> (LinkIndex, IndexStats) {
        let mut index = LinkIndex::empty(&self.extension);
        let mut stats = IndexStats {
            total_files: documents.len(),
            ..IndexStats::default()
        };

        // Pass 1: metadata
        let mut ids = Vec::with_capacity(documents.len());
        for doc in documents {
            let meta = self.metadata_for(&doc.path, Some(&doc.content), doc.modified_at);
            if meta.identifier.is_some() {
                stats.structured += 1;
            } else {
                stats.fallback += 1;
            }
            ids.push(self.register(&mut index, meta));
        }

        // Pass 2: links
        let mut seen: HashSet<(DocumentId, DocumentId)> = HashSet::new();
        for (doc, source_id) in documents.iter().zip(&ids) {
            let refs = extract_links(source_id.as_str(), &doc.content);
            stats.links_found += refs.len();

            for link in refs {
                let Some(target_id) = self.resolve_target(&index, &link) else {
                    stats.unresolved.push(link);
                    continue;
                };
                stats.resolved += 1;

                // A document never backlinks itself.
                if &target_id == source_id {
                    continue;
                }
                if !seen.insert((source_id.clone(), target_id.clone())) {
                    continue;
                }

                let source = &index.documents[source_id];
                let backlink = BackLink {
                    slug: source.slug.clone(),
                    title: source.title.clone(),
                    source_key: source_id.to_string(),
                };
                index
                    .backlinks
                    .entry(target_id)
                    .or_default()
                    .push(backlink);
            }
        }

        index.built_at = SystemTime::now();
        (index, stats)
    }

    /// Forward-only build from a file listing, without content reads.
    /// Serves the fresh-cache path, where the reverse side comes from
    /// the persisted snapshot.
    pub fn build_metadata(&self, entries: &[CorpusEntry]) -> LinkIndex {
        let mut index = LinkIndex::empty(&self.extension);
        for entry in entries {
            let meta = self.metadata_for(&entry.path, None, entry.modified_at);
            self.register(&mut index, meta);
        }
        index
    }

    fn register(&self, index: &mut LinkIndex, meta: DocumentMetadata) -> DocumentId {
        let id = meta.id();
        for alias in aliases_for(&meta, &self.extension) {
            if let Some(previous) = index.aliases.insert(alias.clone(), id.clone()) {
                if previous != id {
                    // Last write wins, in scan order.
                    debug!(
                        "alias {:?} reassigned from {} to {}",
                        alias, previous, id
                    );
                }
            }
        }
        index.documents.insert(id.clone(), meta);
        id
    }

    /// Metadata from the filename convention, with fallback for
    /// unstructured names and in-document keyword overrides.
    fn metadata_for(
        &self,
        path: &Path,
        content: Option<&str>,
        modified_at: SystemTime,
    ) -> DocumentMetadata {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let (identifier, title, slug, tags) = match parse_filename(&filename) {
            Some(parsed) => (
                Some(parsed.identifier),
                parsed.title,
                parsed.slug,
                parsed.tags,
            ),
            None => (
                None,
                String::new(),
                extract_slug_from_filename(&filename),
                Vec::new(),
            ),
        };

        let mut meta = DocumentMetadata {
            identifier,
            title,
            slug,
            tags,
            source_path: path.to_path_buf(),
            modified_at,
        };

        if let Some(text) = content {
            if let Some(title) = extract_title(text) {
                meta.title = title;
            }
            if meta.identifier.is_none() {
                meta.identifier = extract_identifier_keyword(text);
            }
            if meta.tags.is_empty() {
                meta.tags = extract_filetags(text);
            }
        }

        meta
    }

    fn resolve_target(&self, index: &LinkIndex, link: &LinkReference) -> Option<DocumentId> {
        candidate_keys(&link.target_token, &self.extension)
            .iter()
            .find_map(|key| index.aliases.get(key))
            .cloned()
    }
}
