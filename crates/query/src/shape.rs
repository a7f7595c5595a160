//! Response shaping.
//!
//! Flattens the provider's nested answer and reference records into the
//! display schema. Shaping never fails: a reference with missing fields
//! still yields a best-effort citation.

use std::sync::LazyLock;

use kbquery_provider::{OutputMode, Reference, RetrievalResponse};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::types::{Citation, CitationType};

/// Note attached to web citations that carry no snippet.
pub const WEB_SOURCE_NOTE: &str =
    "Web knowledge source references do not include extractive snippets.";

/// Note attached to search index citations that carry no excerpt.
pub const NO_EXCERPT_NOTE: &str = "No excerpt was returned for this reference.";

/// Note attached to unrecognized reference kinds with no source data.
pub const UNSTRUCTURED_SOURCE_NOTE: &str =
    "This source type does not provide a structured excerpt.";

/// Upper bound of the service's semantic reranker score.
const RERANKER_SCORE_MAX: f64 = 4.0;

static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ref_id:(\d+)\]").expect("citation marker pattern"));

static DOUBLE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("double space pattern"));

static SPACE_BEFORE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +([.,;:!?])").expect("punctuation pattern"));

/// Collect answer segments in provider order.
///
/// Consecutive text parts of one message are joined by a blank line into a
/// single answer. In extractive mode a part whose text is a JSON array of
/// passages yields one answer per passage instead. Citation markers are
/// renumbered to match the shaped citation ids.
pub fn extract_answers(response: &RetrievalResponse, mode: Option<OutputMode>) -> Vec<String> {
    let extractive = mode != Some(OutputMode::AnswerSynthesis);
    let reference_count = response.references.len();
    let mut answers = Vec::new();

    for message in &response.messages {
        let mut pending: Vec<&str> = Vec::new();

        for part in message.texts().map(str::trim) {
            let passages = if extractive {
                extractive_passages(part)
            } else {
                Vec::new()
            };

            if passages.is_empty() {
                pending.push(part);
                continue;
            }

            if !pending.is_empty() {
                answers.push(pending.join("\n\n"));
                pending.clear();
            }
            answers.extend(passages);
        }

        if !pending.is_empty() {
            answers.push(pending.join("\n\n"));
        }
    }

    answers
        .into_iter()
        .map(|answer| renumber_citation_markers(&answer, reference_count))
        .filter(|answer| !answer.is_empty())
        .collect()
}

/// Rewrite the provider's zero-based `[ref_id:N]` markers as `[N+1]`, the
/// id of the citation shaped from `references[N]`.
///
/// Markers pointing past the reference list are removed, and the double
/// spaces or spaces before punctuation they leave behind are tidied up.
pub fn renumber_citation_markers(text: &str, reference_count: usize) -> String {
    let renumbered = CITATION_MARKER.replace_all(text, |caps: &Captures<'_>| {
        match caps[1].parse::<usize>() {
            Ok(index) if index < reference_count => format!("[{}]", index + 1),
            _ => String::new(),
        }
    });

    let collapsed = DOUBLE_SPACE.replace_all(&renumbered, " ");
    let tidied = SPACE_BEFORE_PUNCTUATION.replace_all(&collapsed, "$1");
    tidied.trim().to_string()
}

/// Parse a JSON array of extracted passages. Returns an empty vector when
/// the text is not such an array.
fn extractive_passages(text: &str) -> Vec<String> {
    if !text.starts_with('[') {
        return Vec::new();
    }

    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => clean_content(s),
            Value::Object(obj) => obj
                .get("content")
                .or_else(|| obj.get("text"))
                .and_then(Value::as_str)
                .and_then(clean_content),
            _ => None,
        })
        .collect()
}

/// Number every reference 1..N in encounter order and classify it.
pub fn shape_citations(references: &[Reference]) -> Vec<Citation> {
    references
        .iter()
        .zip(1u32..)
        .map(|(reference, id)| shape_reference(id, reference))
        .collect()
}

fn shape_reference(id: u32, reference: &Reference) -> Citation {
    match reference.kind.as_str() {
        "searchIndex" => shape_search_index(id, reference),
        "web" => shape_web(id, reference),
        other => {
            tracing::debug!("Reference {} has unrecognized source kind '{}'", id, other);
            shape_other(id, reference)
        }
    }
}

fn shape_search_index(id: u32, reference: &Reference) -> Citation {
    let mut citation = Citation::new(id, CitationType::SearchIndex);

    citation.document = reference
        .additional_str("docKey")
        .or_else(|| reference.additional_str("title"))
        .map(str::to_string);
    citation.title = reference
        .source_str("title")
        .map(str::to_string)
        .or_else(|| citation.document.clone());
    citation.url = reference.source_str("url").map(str::to_string);
    citation.citation_text = reference.source_str("content").and_then(clean_content);
    citation.relevance_score = reference.reranker_score.and_then(normalize_score);

    if citation.citation_text.is_none() {
        citation.note = Some(NO_EXCERPT_NOTE.to_string());
    }

    citation
}

fn shape_web(id: u32, reference: &Reference) -> Citation {
    let mut citation = Citation::new(id, CitationType::Web);

    citation.title = Some(
        reference
            .source_str("name")
            .or_else(|| reference.source_str("title"))
            .unwrap_or("Web Source")
            .to_string(),
    );
    citation.url = reference.source_str("url").map(str::to_string);
    citation.note = Some(
        reference
            .source_str("snippet")
            .and_then(clean_content)
            .unwrap_or_else(|| WEB_SOURCE_NOTE.to_string()),
    );

    citation
}

fn shape_other(id: u32, reference: &Reference) -> Citation {
    let mut citation = Citation::new(id, CitationType::Other);

    citation.title = reference.source_str("title").map(str::to_string);
    citation.url = reference
        .source_str("url")
        .or_else(|| reference.additional_str("blobUrl"))
        .map(str::to_string);
    citation.document = reference.additional_str("docKey").map(str::to_string);
    citation.relevance_score = reference.reranker_score.and_then(normalize_score);
    citation.note = Some(match &reference.source_data {
        Some(data) if !data.is_null() => data.to_string(),
        _ => UNSTRUCTURED_SOURCE_NOTE.to_string(),
    });

    citation
}

/// Normalize line endings and tabs, trim, and drop empty text.
pub fn clean_content(content: &str) -> Option<String> {
    let cleaned = content.replace("\r\n", "\n").replace('\t', "  ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Map a reranker score onto [0, 1].
pub fn normalize_score(raw: f64) -> Option<f64> {
    if raw.is_nan() {
        return None;
    }
    Some((raw / RERANKER_SCORE_MAX).clamp(0.0, 1.0))
}
