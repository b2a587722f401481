//! Payload envelope recovery from map-search response bodies.
//!
//! Map-search sources ship their listing data inside script payloads
//! embedded in an HTML page. This module pulls those embedded documents
//! back out with a small fixed set of envelope patterns and hands them to
//! the recursive walker as untyped JSON.

use crate::error::{ExtractError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Envelope patterns tried against the response body, in order.
///
/// Each pattern captures one embedded JSON document. Only the first match
/// per pattern is used; listing payloads repeat the same envelope and the
/// first instance carries the result set.
fn envelope_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?s)AF_initDataCallback\s*\([^}]*data\s*:\s*(\[[^\]]+\])")
                .expect("valid envelope regex"),
            Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.+?\});")
                .expect("valid envelope regex"),
        ]
    })
}

/// Recover embedded JSON documents from a response body.
///
/// # Errors
/// - [`ExtractError::NoEnvelope`] when no pattern matches at all
/// - [`ExtractError::InvalidJson`] when envelopes match but none of their
///   contents parse as JSON
pub fn recover_payloads(body: &str) -> Result<Vec<Value>> {
    let mut payloads = Vec::new();
    let mut matched = false;
    let mut last_parse_error = None;

    for pattern in envelope_patterns() {
        let Some(captures) = pattern.captures(body) else {
            continue;
        };
        matched = true;

        let raw = captures.get(1).map_or("", |m| m.as_str());
        // Listing payloads use single-quoted strings; normalize before parsing
        let normalized = raw.replace('\'', "\"");

        match serde_json::from_str::<Value>(&normalized) {
            Ok(value) => payloads.push(value),
            Err(e) => last_parse_error = Some(e),
        }
    }

    if !matched {
        return Err(ExtractError::NoEnvelope);
    }

    if payloads.is_empty() {
        if let Some(e) = last_parse_error {
            return Err(ExtractError::InvalidJson(e));
        }
        return Err(ExtractError::NoEnvelope);
    }

    Ok(payloads)
}
