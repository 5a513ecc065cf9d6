use serde_json::{Map, Value};

use super::partial::{self, PartialFindings, PartialReport, SourceEntry};
use crate::report::{Context, ExecutiveSummary, Recommendations};

const NO_NOTES: &str = "No analysis available";

/// The flat shape written before reports had sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyReport {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub sources: Vec<LegacySource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacySource {
    pub url: String,
    pub reliability: u8,
    pub notes: String,
}

impl LegacyReport {
    /// True when `obj` carries a text `summary` or a list `key_findings`.
    pub fn detect(obj: &Map<String, Value>) -> bool {
        obj.get("summary").is_some_and(Value::is_string) || obj.get("key_findings").is_some_and(Value::is_array)
    }

    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let sources = obj
            .get("sources")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|s| LegacySource {
                        url: partial::text(s, "url").unwrap_or_default(),
                        reliability: s.get("reliability").map(partial::reliability_from_value).unwrap_or(0),
                        notes: partial::text(s, "notes").unwrap_or_else(|| NO_NOTES.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        LegacyReport {
            summary: partial::text(obj, "summary").unwrap_or_default(),
            key_findings: partial::list(obj, "key_findings").unwrap_or_default(),
            sources,
        }
    }

    /// Translate field by field into the sectioned shape.
    ///
    /// Key findings become both highlights and themes; the last two of them
    /// double as conclusions.
    pub fn into_partial(self) -> PartialReport {
        let conclusions = self.key_findings[self.key_findings.len().saturating_sub(2)..].to_vec();
        let sources = self
            .sources
            .into_iter()
            .map(|s| SourceEntry {
                url: s.url,
                reliability_score: s.reliability,
                reasoning: Some(s.notes),
                ..Default::default()
            })
            .collect();

        PartialReport {
            executive_summary: Some(ExecutiveSummary {
                overview: self.summary,
                highlights: self.key_findings.clone(),
                conclusions,
            }),
            detailed_findings: Some(PartialFindings {
                themes: self.key_findings,
                ..Default::default()
            }),
            source_analysis: Some(sources),
            context: Some(Context::default()),
            recommendations: Some(Recommendations::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn detection() {
        assert!(LegacyReport::detect(&obj(json!({ "summary": "S" }))));
        assert!(LegacyReport::detect(&obj(json!({ "key_findings": [] }))));
        assert!(!LegacyReport::detect(&obj(json!({ "summary": { "overview": "x" } }))));
        assert!(!LegacyReport::detect(&obj(json!({ "key_findings": "a, b" }))));
        assert!(!LegacyReport::detect(&obj(json!({ "executive_summary": {} }))));
    }

    #[test]
    fn conclusions_are_last_two_findings() {
        let legacy = LegacyReport::from_object(&obj(json!({ "key_findings": ["A", "B", "C"] })));
        let p = legacy.into_partial();
        assert_eq!(p.executive_summary.unwrap().conclusions, vec!["B".to_string(), "C".to_string()]);

        let single = LegacyReport::from_object(&obj(json!({ "key_findings": ["only"] }))).into_partial();
        assert_eq!(single.executive_summary.unwrap().conclusions, vec!["only".to_string()]);
    }

    #[test]
    fn sources_default_missing_fields() {
        let legacy = LegacyReport::from_object(&obj(json!({
            "summary": "S",
            "sources": [{ "url": "https://a.example", "reliability": 80, "notes": "gov site" }, {}]
        })));
        assert_eq!(legacy.sources[0].reliability, 80);
        assert_eq!(legacy.sources[1].url, "");
        assert_eq!(legacy.sources[1].reliability, 0);
        assert_eq!(legacy.sources[1].notes, NO_NOTES);

        let entries = legacy.into_partial().source_analysis.unwrap();
        assert_eq!(entries[0].reasoning.as_deref(), Some("gov site"));
    }
}
