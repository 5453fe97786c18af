use regex::Regex;
use std::sync::LazyLock;

use crate::config::DEFAULT_EXTENSION;
use crate::model::{LinkFormat, LinkReference};

/// `denote:<identifier>`, bare or inside a bracketed link.
static IDENTIFIER_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"denote:(\d{8}T\d{6})").unwrap());

/// `[[target]]` or `[[target][label]]`.
static BRACKET_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]\[]+)\](?:\[([^\]\[]*)\])?\]").unwrap());

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*#\+title:\s*(.+)$").unwrap());

static IDENTIFIER_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*#\+identifier:\s*(\S+)").unwrap());

static FILETAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^\s*#\+filetags:\s*(.+)$").unwrap());

/// Extract every outbound reference from a document's raw text.
///
/// All occurrences are reported, including repeats of the same target;
/// deduplication is the index builder's concern.
pub fn extract_links(source: &str, text: &str) -> Vec<LinkReference> {
    let mut refs = Vec::new();

    for caps in IDENTIFIER_LINK_RE.captures_iter(text) {
        refs.push(LinkReference {
            source: source.to_string(),
            target_token: caps[1].to_string(),
            format: LinkFormat::Identifier,
        });
    }

    for caps in BRACKET_LINK_RE.captures_iter(text) {
        let target = caps[1].trim();

        // Already reported by the identifier pass above.
        if target.starts_with("denote:") {
            continue;
        }
        if is_unindexable(target) {
            continue;
        }

        refs.push(LinkReference {
            source: source.to_string(),
            target_token: target.to_string(),
            format: classify(target),
        });
    }

    refs
}

/// Absolute URLs, in-page anchors and absolute site paths are never
/// corpus references.
fn is_unindexable(target: &str) -> bool {
    target.is_empty()
        || target.contains("://")
        || target.starts_with('#')
        || target.starts_with('/')
}

fn classify(target: &str) -> LinkFormat {
    let dot_ext = format!(".{}", DEFAULT_EXTENSION);
    if target.starts_with("file:")
        || target.starts_with("./")
        || target.starts_with("../")
        || target.contains('/')
        || target.ends_with(&dot_ext)
    {
        LinkFormat::FileLink
    } else {
        LinkFormat::BareSlug
    }
}

/// `#+title:` declaration, overriding the filename-derived title.
pub fn extract_title(text: &str) -> Option<String> {
    TITLE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// `#+identifier:` declaration, for documents whose filename carries none.
pub fn extract_identifier_keyword(text: &str) -> Option<String> {
    IDENTIFIER_KEYWORD_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
        .filter(|id| crate::filename::is_identifier(id))
}

/// `#+filetags:` declaration, split on `:` and whitespace.
pub fn extract_filetags(text: &str) -> Vec<String> {
    FILETAGS_RE
        .captures(text)
        .map(|caps| {
            caps[1]
                .split(|c: char| c == ':' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_identifier_link() {
        let refs = extract_links("src", "See denote:20240326T195811 for containers.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target_token, "20240326T195811");
        assert_eq!(refs[0].format, LinkFormat::Identifier);
        assert_eq!(refs[0].source, "src");
    }

    #[test]
    fn test_extract_bracketed_identifier_link() {
        let refs = extract_links("src", "See [[denote:20240326T195811][LXD]] for containers.");
        assert_eq!(refs.len(), 1, "Bracketed form must not double-count");
        assert_eq!(refs[0].target_token, "20240326T195811");
        assert_eq!(refs[0].format, LinkFormat::Identifier);
    }

    #[test]
    fn test_extract_bare_slug_link() {
        let refs = extract_links("src", "Try [[emacs]] sometime.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target_token, "emacs");
        assert_eq!(refs[0].format, LinkFormat::BareSlug);
    }

    #[test]
    fn test_extract_file_link_with_label() {
        let refs = extract_links("src", "See [[./docker.org][Docker]] for details.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target_token, "./docker.org");
        assert_eq!(refs[0].format, LinkFormat::FileLink);
    }

    #[test]
    fn test_extract_file_prefix_link() {
        let refs = extract_links("src", "[[file:docker.org][Docker]]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target_token, "file:docker.org");
        assert_eq!(refs[0].format, LinkFormat::FileLink);
    }

    #[test]
    fn test_extract_skips_external_targets() {
        let text = "[[https://example.com][ext]] [[#section]] [[/about/]]";
        assert!(extract_links("src", text).is_empty());
    }

    #[test]
    fn test_extract_mixed_formats() {
        let text = "denote:20240326T195811 and [[emacs]] and [[./docker.org]]";
        let refs = extract_links("src", text);
        assert_eq!(refs.len(), 3);
    }

    #[test]
    fn test_extract_reports_repeats() {
        let text = "[[emacs]] twice [[emacs]]";
        let refs = extract_links("src", text);
        assert_eq!(refs.len(), 2, "Dedup happens in the builder, not here");
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("#+title: My Post\n\nBody"),
            Some("My Post".to_string())
        );
        assert_eq!(extract_title("no declaration"), None);
    }

    #[test]
    fn test_extract_identifier_keyword() {
        assert_eq!(
            extract_identifier_keyword("#+identifier: 20240326T195811\n"),
            Some("20240326T195811".to_string())
        );
        // Malformed identifiers are ignored
        assert_eq!(extract_identifier_keyword("#+identifier: not-a-stamp"), None);
    }

    #[test]
    fn test_extract_filetags() {
        assert_eq!(
            extract_filetags("#+filetags: :web:dev:\n"),
            vec!["web".to_string(), "dev".to_string()]
        );
        assert!(extract_filetags("body only").is_empty());
    }
}
