//! Match Result Normalizer: reduces either wire shape of the matchmaking response to
//! one list of posting groups.
//!
//! Shapes are told apart by a structural probe, never by guessing:
//! - flat pairs: an object holding a `mutual_matches` (or `matches`) array of
//!   `{profile?, job?, score?, reason?, company?}` entries; a missing name falls back to
//!   `Candidate <profile_id>` / `Job <posting_id>`, or the entry's 1-based position
//! - grouped: an array of `{posting_file, mutual_matches, verdict?}` entries
//!
//! Anything else is rejected with `MatchError::UnsupportedShape`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::matching::MatchError;

/// Object fields that may hold the flat pair list, in probe order.
const FLAT_LIST_FIELDS: &[&str] = &["mutual_matches", "matches"];

// ────────────────────────────────────────────────────────────────────────────
// Normalized shape
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedProfile {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MatchedProfile {
    fn plain(label: String) -> Self {
        Self {
            label,
            score: None,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub source_posting_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub matched_profiles: Vec<MatchedProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Value>,
}

impl MatchGroup {
    pub fn matched_profile_labels(&self) -> Vec<&str> {
        self.matched_profiles
            .iter()
            .map(|m| m.label.as_str())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct FlatPair {
    #[serde(default, alias = "candidate_name", alias = "profile_name")]
    pub profile: Option<String>,
    #[serde(default, alias = "job_title", alias = "posting_title")]
    pub job: Option<String>,
    #[serde(default)]
    pub profile_id: Option<Value>,
    #[serde(default)]
    pub posting_id: Option<Value>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, alias = "match_score", deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupedEntry {
    pub posting_file: String,
    pub mutual_matches: Vec<String>,
    #[serde(default)]
    pub verdict: Option<Value>,
}

#[derive(Debug, Clone)]
pub enum MatchResponse {
    FlatPairs(Vec<FlatPair>),
    Grouped(Vec<GroupedEntry>),
}

impl MatchResponse {
    pub fn decode(body: Value) -> Result<Self, MatchError> {
        match body {
            Value::Array(entries) => {
                let grouped = entries.iter().all(|entry| {
                    entry.get("posting_file").is_some() && entry.get("mutual_matches").is_some()
                });
                if !grouped {
                    return Err(MatchError::UnsupportedShape(
                        "array entries lack posting_file/mutual_matches".to_string(),
                    ));
                }
                serde_json::from_value(Value::Array(entries))
                    .map(MatchResponse::Grouped)
                    .map_err(|e| MatchError::UnsupportedShape(format!("grouped entries: {e}")))
            }
            Value::Object(mut fields) => {
                let list = FLAT_LIST_FIELDS
                    .iter()
                    .find_map(|key| match fields.remove(*key) {
                        Some(list @ Value::Array(_)) => Some(list),
                        _ => None,
                    })
                    .ok_or_else(|| {
                        MatchError::UnsupportedShape(
                            "object has no mutual_matches or matches list".to_string(),
                        )
                    })?;
                serde_json::from_value(list)
                    .map(MatchResponse::FlatPairs)
                    .map_err(|e| MatchError::UnsupportedShape(format!("flat pairs: {e}")))
            }
            other => Err(MatchError::UnsupportedShape(format!(
                "expected an object or array, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn into_groups(self) -> Vec<MatchGroup> {
        match self {
            MatchResponse::FlatPairs(pairs) => group_flat_pairs(pairs),
            MatchResponse::Grouped(entries) => entries
                .into_iter()
                .map(|entry| MatchGroup {
                    source_posting_label: clean_label(&entry.posting_file),
                    company: None,
                    matched_profiles: entry
                        .mutual_matches
                        .iter()
                        .map(|label| MatchedProfile::plain(clean_label(label)))
                        .collect(),
                    verdict: entry.verdict,
                })
                .collect(),
        }
    }
}

/// Decodes and normalizes a raw response body.
pub fn normalize(body: Value) -> Result<Vec<MatchGroup>, MatchError> {
    MatchResponse::decode(body).map(MatchResponse::into_groups)
}

/// Groups by job in order of first appearance; profiles keep response order.
fn group_flat_pairs(pairs: Vec<FlatPair>) -> Vec<MatchGroup> {
    let mut groups: Vec<MatchGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (position, pair) in pairs.into_iter().enumerate() {
        let job = fallback_label(pair.job, pair.posting_id.as_ref(), "Job", position + 1);
        let profile = fallback_label(
            pair.profile,
            pair.profile_id.as_ref(),
            "Candidate",
            position + 1,
        );

        let slot = *index.entry(job.clone()).or_insert_with(|| {
            groups.push(MatchGroup {
                source_posting_label: job,
                company: None,
                matched_profiles: Vec::new(),
                verdict: None,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        if group.company.is_none() {
            group.company = pair.company.filter(|c| !c.trim().is_empty());
        }
        group.matched_profiles.push(MatchedProfile {
            label: profile,
            score: pair.score,
            reason: pair.reason,
        });
    }

    groups
}

/// The entry's own name, else `<kind> <id>`, else `<kind> <position>`.
/// Empty names and falsy ids count as missing.
fn fallback_label(
    name: Option<String>,
    id: Option<&Value>,
    kind: &str,
    position: usize,
) -> String {
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        return name;
    }
    let id = match id {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    };
    format!("{kind} {}", id.unwrap_or_else(|| position.to_string()))
}

/// Recovers a human label from a generated filename: drops a trailing `.txt`, then a
/// trailing `_<digits>`, repeating until neither applies.
pub fn clean_label(label: &str) -> String {
    let mut current = label;
    loop {
        let next = strip_numeric_suffix(current.strip_suffix(".txt").unwrap_or(current));
        if next == current {
            return current.to_string();
        }
        current = next;
    }
}

fn strip_numeric_suffix(label: &str) -> &str {
    match label.rsplit_once('_') {
        Some((head, digits)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            head
        }
        _ => label,
    }
}

fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
