use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Canonical document key
/// A document is addressed by its timestamp identifier when the filename
/// carries one, by its file stem otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    Identifier(String),
    Filename(String),
}

impl DocumentId {
    /// Rebuild a `DocumentId` from its persisted string form.
    pub fn from_key(key: &str) -> Self {
        if crate::filename::is_identifier(key) {
            DocumentId::Identifier(key.to_string())
        } else {
            DocumentId::Filename(key.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocumentId::Identifier(s) => s,
            DocumentId::Filename(s) => s,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// On the wire the id is just its key string; the variant is recovered
// from the shape of the key on load.
impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(DocumentId::from_key(&key))
    }
}

/// One per corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Timestamp token from the filename prefix, stable across renames of
    /// the title segment.
    pub identifier: Option<String>,
    pub title: String,
    pub slug: String,
    pub tags: Vec<String>,
    /// Corpus-relative path.
    pub source_path: PathBuf,
    pub modified_at: SystemTime,
}

impl DocumentMetadata {
    /// The canonical key this document is indexed under.
    pub fn id(&self) -> DocumentId {
        match &self.identifier {
            Some(identifier) => DocumentId::Identifier(identifier.clone()),
            None => DocumentId::Filename(self.stem()),
        }
    }

    /// File stem of the source path.
    pub fn stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Canonical content URL for this document.
    pub fn href(&self) -> String {
        content_href(&self.slug)
    }

    /// Human-readable label, falling back to the slug for untitled documents.
    pub fn display_label(&self) -> &str {
        if self.title.is_empty() {
            &self.slug
        } else {
            &self.title
        }
    }
}

/// Canonical href for a resolved slug.
pub fn content_href(slug: &str) -> String {
    format!("/content/{}/", slug)
}

/// Which textual pattern a reference matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFormat {
    /// `denote:<identifier>`, bare or bracketed.
    Identifier,
    /// `[[slug]]`
    BareSlug,
    /// `[[file:path][label]]` and other path-shaped targets.
    FileLink,
}

/// One outbound reference found in a document's raw text, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReference {
    /// Key of the referring document (identifier or stem).
    pub source: String,
    /// The target exactly as written.
    pub target_token: String,
    pub format: LinkFormat,
}

/// Reverse-index value: one referring document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackLink {
    pub slug: String,
    pub title: String,
    /// Key of the referring document at index-build time.
    pub source_key: String,
}

impl BackLink {
    pub fn href(&self) -> String {
        content_href(&self.slug)
    }

    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.slug
        } else {
            &self.title
        }
    }
}

/// `{href, label}` pair handed to the rendering pipeline for the
/// "Linked References" section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedReference {
    pub href: String,
    pub label: String,
}

/// A corpus file as enumerated by the scanner: path and mtime only.
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub path: PathBuf,
    pub modified_at: SystemTime,
}

/// A corpus file with its contents read.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub path: PathBuf,
    pub content: String,
    pub modified_at: SystemTime,
}

impl ScannedDocument {
    pub fn entry(&self) -> CorpusEntry {
        CorpusEntry {
            path: self.path.clone(),
            modified_at: self.modified_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_from_key() {
        assert_eq!(
            DocumentId::from_key("20240326T195811"),
            DocumentId::Identifier("20240326T195811".to_string())
        );
        assert_eq!(
            DocumentId::from_key("docker"),
            DocumentId::Filename("docker".to_string())
        );
        // Close but not an identifier: wrong separator
        assert_eq!(
            DocumentId::from_key("20240326X195811"),
            DocumentId::Filename("20240326X195811".to_string())
        );
    }

    #[test]
    fn test_document_id_serde_round_trip() {
        let id = DocumentId::Identifier("20240326T195811".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"20240326T195811\"");
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_content_href() {
        assert_eq!(content_href("emacs"), "/content/emacs/");
    }

    #[test]
    fn test_backlink_label_falls_back_to_slug() {
        let bl = BackLink {
            slug: "docker".to_string(),
            title: String::new(),
            source_key: "docker".to_string(),
        };
        assert_eq!(bl.label(), "docker");
        assert_eq!(bl.href(), "/content/docker/");
    }
}
