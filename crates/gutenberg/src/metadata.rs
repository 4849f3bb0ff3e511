use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_AUTHOR: &str = "Unknown Author";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PUBLISHER: &str = "Project Gutenberg";
pub const DEFAULT_RIGHTS: &str = "Public domain";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub language: String,
    pub publisher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    pub rights: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl BookMetadata {
    /// The record served when nothing could be extracted for `book_id`
    pub fn fallback(book_id: u32) -> Self {
        Self {
            title: format!("Book #{}", book_id),
            author: DEFAULT_AUTHOR.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            publisher: DEFAULT_PUBLISHER.to_string(),
            publication_date: None,
            rights: DEFAULT_RIGHTS.to_string(),
            subjects: Vec::new(),
        }
    }
}

/// Build a metadata record from a Gutenberg RDF document.
///
/// This is tag scraping, not XML parsing: each scalar field takes the first
/// `<tag ...>value</tag>` text capture, and anything missing falls back to
/// the defaults of [`BookMetadata::fallback`].
pub fn parse_metadata(book_id: u32, rdf: &str) -> BookMetadata {
    let fallback = BookMetadata::fallback(book_id);
    let or_default = |value: String, default: String| {
        if value.is_empty() { default } else { value }
    };

    let publication_date = extract_xml_value(rdf, "dcterms:issued");

    BookMetadata {
        title: or_default(extract_xml_value(rdf, "dcterms:title"), fallback.title),
        author: or_default(extract_xml_value(rdf, "pgterms:name"), fallback.author),
        language: or_default(extract_xml_value(rdf, "dcterms:language"), fallback.language),
        publisher: or_default(extract_xml_value(rdf, "dcterms:publisher"), fallback.publisher),
        publication_date: (!publication_date.is_empty()).then_some(publication_date),
        rights: or_default(extract_xml_value(rdf, "dcterms:rights"), fallback.rights),
        subjects: extract_subjects(rdf),
    }
}

/// First text capture of `tag`, trimmed, or an empty string
pub fn extract_xml_value(xml: &str, tag: &str) -> String {
    extract_xml_values(xml, tag).into_iter().next().unwrap_or_default()
}

/// Every non-empty text capture of `tag`, trimmed, in document order
pub fn extract_xml_values(xml: &str, tag: &str) -> Vec<String> {
    let Some(re) = tag_pattern(tag, "([^<]+)") else {
        return Vec::new();
    };

    re.captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Subjects appear either as plain `dcterms:subject` text or, in current
/// Gutenberg RDF, as `rdf:value` entries nested inside the subject element.
fn extract_subjects(rdf: &str) -> Vec<String> {
    let mut subjects = extract_xml_values(rdf, "dcterms:subject");

    if let Some(block) = tag_pattern("dcterms:subject", "(?s)(.*?)") {
        for caps in block.captures_iter(rdf) {
            if let Some(inner) = caps.get(1) {
                subjects.extend(extract_xml_values(inner.as_str(), "rdf:value"));
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    subjects.retain(|subject| seen.insert(subject.clone()));
    subjects
}

fn tag_pattern(tag: &str, body: &str) -> Option<Regex> {
    let tag = regex::escape(tag);
    let pattern = format!("<{tag}[^>]*>{body}</{tag}>");
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(tag = %tag, error = %e, "Invalid metadata tag pattern");
            None
        }
    }
}
