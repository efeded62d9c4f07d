//! Data-source extraction from macro code
//!
//! Runs a fixed list of independent regex searches over VBA source and
//! unions the captures. Connection-string keys (`Provider=`, `Server=`, ...)
//! capture up to the next `;`; file calls capture the quoted path.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static SOURCE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

const PATTERN_SOURCES: &[&str] = &[
    // Connection string fragments
    r"(?i)Provider=([^;]+)",
    r"(?i)Data Source=([^;]+)",
    r"(?i)Server=([^;]+)",
    r"(?i)Database=([^;]+)",
    r"(?i)DSN=([^;]+)",
    // File access
    r#"(?i)Open\s+"([^"]+)""#,
    r#"(?i)Workbooks\.Open\s*\("([^"]+)"\)"#,
    r#"(?i)GetOpenFilename\s*\("([^"]+)""#,
];

fn source_patterns() -> &'static [Regex] {
    SOURCE_PATTERNS.get_or_init(|| {
        PATTERN_SOURCES
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect()
    })
}

/// Extract distinct connection-string and file-path fragments from macro code
pub fn extract_data_sources(code: &str) -> BTreeSet<String> {
    let mut sources = BTreeSet::new();
    if code.is_empty() {
        return sources;
    }

    for pattern in source_patterns() {
        for caps in pattern.captures_iter(code) {
            if let Some(m) = caps.get(1) {
                sources.insert(m.as_str().to_string());
            }
        }
    }

    sources
}

/// Union of [`extract_data_sources`] over several texts
pub fn extract_from_all<'a, I>(texts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    texts
        .into_iter()
        .flat_map(extract_data_sources)
        .collect()
}
