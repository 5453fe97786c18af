use regex::Regex;
use std::sync::LazyLock;

/// Structured filename stem: `<8-digit-date>T<6-digit-time>--<title>`
/// optionally followed by `__<tag1>_<tag2>_...`.
static STEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{8}T\d{6})--(.+?)(?:__(.+?))?$").unwrap());

/// Metadata carried by a structured filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub identifier: String,
    pub title: String,
    pub slug: String,
    pub tags: Vec<String>,
}

/// Check whether a token is a timestamp identifier (`\d{8}T\d{6}`).
pub fn is_identifier(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 15
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'T'
        && bytes[9..].iter().all(u8::is_ascii_digit)
}

/// Strip the final dot-extension, if any.
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => &filename[..pos],
        _ => filename,
    }
}

/// Parse a filename against the structured convention.
///
/// Returns `None` for filenames that do not follow the convention; this
/// is not an error, callers fall back to the bare stem as the slug.
pub fn parse_filename(filename: &str) -> Option<ParsedFilename> {
    let caps = STEM_RE.captures(file_stem(filename))?;

    let identifier = caps[1].to_string();
    let title_segment = &caps[2];
    let tags = caps
        .get(3)
        .map(|m| {
            m.as_str()
                .split('_')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(ParsedFilename {
        identifier,
        title: title_segment.replace('-', " "),
        slug: extract_slug_from_filename(filename),
        tags,
    })
}

/// Derive the canonical URL slug from a filename.
///
/// Single slug function for both the structured and fallback paths:
/// strip the extension, strip a structured identifier prefix when
/// present, drop the tag suffix, lowercase, and sanitize anything
/// outside `[a-z0-9-]`.
///
/// # Examples
///
/// ```
/// use rhizome_core::extract_slug_from_filename;
///
/// assert_eq!(extract_slug_from_filename("20240326T195811--lxd__lxd_ubuntu.org"), "lxd");
/// assert_eq!(extract_slug_from_filename("emacs.org"), "emacs");
/// ```
pub fn extract_slug_from_filename(filename: &str) -> String {
    let stem = file_stem(filename);

    let without_prefix = match stem.split_once("--") {
        Some((prefix, rest)) if is_identifier(prefix) => rest,
        _ => stem,
    };

    let title_segment = without_prefix
        .split("__")
        .next()
        .unwrap_or(without_prefix);

    sanitize_slug(title_segment)
}

fn sanitize_slug(segment: &str) -> String {
    segment
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}
