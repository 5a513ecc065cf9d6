use serde::Serialize;
use serde_json::{Map, Value};

use crate::report::{Context, ExecutiveSummary, Recommendations};

/// A report-shaped record with no guarantee that any section is present.
///
/// The parser, the fallback synthesizer and the lenient JSON decoder all
/// produce this; only the normalizer turns it into a full report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<ExecutiveSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_findings: Option<PartialFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_analysis: Option<Vec<SourceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Recommendations>,
}

/// Findings as they come out of text: `patterns` has no place in a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialFindings {
    pub themes: Vec<String>,
    pub evidence: Vec<String>,
    pub opposing_views: Vec<String>,
    pub patterns: Vec<String>,
}

/// One source as listed in analysis text, fallback output or a legacy report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub url: String,
    pub reliability_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub citations: u32,
    pub publication_date: String,
}

impl PartialReport {
    /// Decode any JSON value into the canonical partial shape.
    ///
    /// Fields with the wrong JSON type count as absent; non-text list items
    /// are skipped. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return PartialReport::default();
        };

        PartialReport {
            executive_summary: section(obj, "executive_summary").map(|s| ExecutiveSummary {
                overview: text(s, "overview").unwrap_or_default(),
                highlights: list(s, "highlights").unwrap_or_default(),
                conclusions: list(s, "conclusions").unwrap_or_default(),
            }),
            detailed_findings: section(obj, "detailed_findings").map(|s| PartialFindings {
                themes: list(s, "themes").unwrap_or_default(),
                evidence: list(s, "evidence").unwrap_or_default(),
                opposing_views: list(s, "opposing_views").unwrap_or_default(),
                patterns: list(s, "patterns").unwrap_or_default(),
            }),
            source_analysis: obj.get("source_analysis").and_then(source_entries),
            context: section(obj, "context").map(|s| Context {
                historical: text(s, "historical").unwrap_or_default(),
                current: text(s, "current").unwrap_or_default(),
                future: text(s, "future").unwrap_or_default(),
                impacts: list(s, "impacts").unwrap_or_default(),
            }),
            recommendations: section(obj, "recommendations").map(|s| Recommendations {
                actions: list(s, "actions").unwrap_or_default(),
                research: list(s, "research").unwrap_or_default(),
                risks: list(s, "risks").unwrap_or_default(),
                strategy: list(s, "strategy").unwrap_or_default(),
            }),
        }
    }
}

/// Accepts a list of `{url, ...}` entries or a `url → record` mapping.
fn source_entries(value: &Value) -> Option<Vec<SourceEntry>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|o| source_entry(text(o, "url").unwrap_or_default(), o))
                .collect(),
        ),
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(url, v)| v.as_object().map(|o| source_entry(url.clone(), o)))
                .collect(),
        ),
        _ => None,
    }
}

fn source_entry(url: String, o: &Map<String, Value>) -> SourceEntry {
    SourceEntry {
        url,
        reliability_score: o.get("reliability_score").map(reliability_from_value).unwrap_or(0),
        expertise: text(o, "expertise"),
        reasoning: text(o, "reasoning"),
        citations: o.get("citations").map(count_from_value).unwrap_or(0),
        publication_date: text(o, "publication_date").unwrap_or_default(),
    }
}

pub(crate) fn section<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

pub(crate) fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn list(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
}

/// Parse a credibility score written as text, e.g. `85%`.
///
/// Non-digits are dropped before parsing; failure is 0; result is capped at 100.
pub fn reliability_from_text(raw: &str) -> u8 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u64>().map(|n| n.min(100) as u8).unwrap_or(0)
}

pub(crate) fn reliability_from_value(value: &Value) -> u8 {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.clamp(0, 100) as u8,
            None => n.as_f64().map(|f| f.clamp(0.0, 100.0) as u8).unwrap_or(0),
        },
        Value::String(s) => reliability_from_text(s),
        _ => 0,
    }
}

fn count_from_value(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|c| c.min(u64::from(u32::MAX)) as u32)
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u32))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
