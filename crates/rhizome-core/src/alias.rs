//! Alias normalization.
//!
//! One document is addressable by several reference spellings (bare
//! slug, slug with extension, identifier, basename of a relative path).
//! Both sides of the lookup live here: the alias forms a document is
//! registered under, and the candidate keys a written token is resolved
//! through.

use crate::model::DocumentMetadata;

/// Every alias a document is registered under in the forward index.
///
/// Later registrations win on collision, in scan order.
pub fn aliases_for(meta: &DocumentMetadata, ext: &str) -> Vec<String> {
    let stem = meta.stem();
    let mut aliases = Vec::new();

    if let Some(identifier) = &meta.identifier {
        push_unique(&mut aliases, identifier.clone());
    }
    push_unique(&mut aliases, meta.slug.clone());
    push_unique(&mut aliases, format!("{}.{}", meta.slug, ext));
    push_unique(&mut aliases, stem.clone());
    push_unique(&mut aliases, format!("{}.{}", stem, ext));

    aliases
}

/// Lookup forms for a reference token as written.
///
/// Cleans the token (`file:` prefix, leading `./`, backslashes) and
/// generates every form the forward index might know it by: as written,
/// extension stripped or appended, the basename of a path, and the
/// lowercased variant of each. Returns an empty list for targets that
/// can never name a corpus document (absolute URLs, anchors, absolute
/// site paths).
///
/// # Examples
///
/// ```
/// use rhizome_core::alias::candidate_keys;
///
/// let keys = candidate_keys("file:./docker.org", "org");
/// assert!(keys.contains(&"docker".to_string()));
/// assert!(candidate_keys("https://example.com", "org").is_empty());
/// ```
pub fn candidate_keys(token: &str, ext: &str) -> Vec<String> {
    let mut cleaned = token.trim().replace('\\', "/");
    if let Some(rest) = cleaned.strip_prefix("file:") {
        cleaned = rest.to_string();
    }
    while let Some(rest) = cleaned.strip_prefix("./") {
        cleaned = rest.to_string();
    }

    if cleaned.is_empty()
        || cleaned.contains("://")
        || cleaned.starts_with('#')
        || cleaned.starts_with('/')
    {
        return Vec::new();
    }

    let dot_ext = format!(".{}", ext);
    let mut keys = Vec::new();

    expand(&mut keys, &cleaned, &dot_ext);
    if let Some(basename) = cleaned.rsplit('/').next() {
        if basename != cleaned {
            expand(&mut keys, basename, &dot_ext);
        }
    }

    for i in 0..keys.len() {
        let lower = keys[i].to_lowercase();
        push_unique(&mut keys, lower);
    }

    keys
}

/// The form itself plus its extension-stripped or extension-appended twin.
fn expand(keys: &mut Vec<String>, form: &str, dot_ext: &str) {
    push_unique(keys, form.to_string());
    match form.strip_suffix(dot_ext) {
        Some(stripped) if !stripped.is_empty() => push_unique(keys, stripped.to_string()),
        _ => push_unique(keys, format!("{}{}", form, dot_ext)),
    }
}

fn push_unique(keys: &mut Vec<String>, key: String) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}
