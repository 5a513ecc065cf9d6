//! Turns free-form research analysis text into a validated, sectioned report.
//!
//! Three ways in: [`parse_analysis`] for generative-model output,
//! [`synthesize_fallback`] for raw search hits when no model text exists, and
//! [`normalize_value`] / [`import_report`] for stored or older report data.

pub mod config;
pub mod db;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod parser;
pub mod report;

use serde_json::Value;
use tracing::debug;

pub use error::{Error, Result};
pub use fallback::ContentRecord;
pub use normalize::normalize_value;
pub use report::{Origin, Report, ReportBuilder, ReportSections};

/// Parse generative analysis text into a report.
pub fn parse_analysis(query: &str, text: &str) -> Report {
    let partial = parser::parse_sections(text);
    let sections = normalize::normalize_partial(partial);
    let report = ReportBuilder::from_sections(query, Origin::Analysis, sections);
    debug!(%report, "parsed analysis");
    report
}

/// Build the template report used when no analysis text is available.
pub fn synthesize_fallback(query: &str, records: &[ContentRecord]) -> Report {
    let partial = fallback::synthesize(query, records);
    let sections = normalize::normalize_partial(partial);
    ReportBuilder::from_sections(query, Origin::Fallback, sections)
}

/// Rebuild a stored or cross-version report.
///
/// A top-level `query` text and a known `origin` are kept; a missing or
/// unknown origin becomes [`Origin::Imported`].
pub fn import_report(value: &Value) -> Report {
    let query = value.get("query").and_then(Value::as_str).unwrap_or_default();
    let origin = value
        .get("origin")
        .and_then(|o| serde_json::from_value::<Origin>(o.clone()).ok())
        .unwrap_or(Origin::Imported);
    ReportBuilder::from_sections(query, origin, normalize_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
    }

    fn renormalized(report: &Report) -> ReportSections {
        normalize_value(&serde_json::to_value(report).unwrap())
    }

    #[test]
    fn parsed_report_round_trips_through_normalizer() {
        let text = fixture("full_response.txt");
        let report = parse_analysis("solid-state batteries", &text);
        assert_eq!(report.origin(), Origin::Analysis);
        assert_eq!(report.sections(), &normalize::normalize_partial(parser::parse_sections(&text)));
        assert_eq!(&renormalized(&report), report.sections());
        assert!(report.empty_sections().is_empty());

        let sources = report.source_analysis();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources["https://journal.example.org/ssb-review"].reliability_score, 90);
        assert_eq!(sources["https://journal.example.org/ssb-review"].expertise, "Peer-reviewed academic");
    }

    #[test]
    fn empty_theme_bullet_survives_into_report() {
        let text = "2. DETAILED FINDINGS\nMajor Themes:\n-\n* Real theme\n";
        let report = parse_analysis("q", text);
        assert_eq!(report.detailed_findings().themes, vec![String::new(), "Real theme".to_string()]);
        assert_eq!(report.sections(), &normalize::normalize_partial(parser::parse_sections(text)));
    }

    #[test]
    fn two_sources_both_85() {
        let text = "3. SOURCE ANALYSIS\nURL: https://a.example\nCredibility Score: 85%\nURL: https://b.example\nCredibility Score: 85%\n";
        let report = parse_analysis("q", text);
        let scores: Vec<u8> = report.source_analysis().values().map(|s| s.reliability_score).collect();
        assert_eq!(scores, vec![85, 85]);
    }

    #[test]
    fn garbage_text_still_yields_full_report() {
        let report = parse_analysis("q", "\u{0}\u{feff}???\n- - -\n***\nURL: nowhere");
        assert_eq!(report.sections(), &ReportSections::default());
        assert_eq!(report.empty_sections().len(), 5);
    }

    #[test]
    fn fallback_report_round_trips() {
        let records: Vec<ContentRecord> = serde_json::from_str(&fixture("search_hits.json")).unwrap();
        let report = synthesize_fallback("batteries", &records);
        assert_eq!(report.origin(), Origin::Fallback);
        assert_eq!(report.executive_summary().overview, "Basic analysis of 3 sources about 'batteries'");
        assert_eq!(report.source_analysis().len(), 3);
        assert!(report
            .source_analysis()
            .values()
            .all(|s| s.reliability_score == 70 && s.expertise == "Basic credibility assessment"));
        assert_eq!(&renormalized(&report), report.sections());
    }

    #[test]
    fn fallback_without_records() {
        let report = synthesize_fallback("batteries", &[]);
        assert_eq!(report.executive_summary().overview, fallback::NO_CONTENT);
        assert!(report.source_analysis().is_empty());
    }

    #[test]
    fn import_keeps_query_and_origin() {
        let stored = serde_json::to_value(parse_analysis("q1", &fixture("full_response.txt"))).unwrap();
        let imported = import_report(&stored);
        assert_eq!(imported.query(), "q1");
        assert_eq!(imported.origin(), Origin::Analysis);
        assert_eq!(serde_json::to_value(&imported).unwrap(), stored);
    }

    #[test]
    fn import_legacy_report() {
        let imported = import_report(&json!({
            "query": "old",
            "summary": "S",
            "key_findings": ["A", "B", "C"],
            "sources": [{ "url": "https://a.example", "reliability": 65, "notes": "blog" }]
        }));
        assert_eq!(imported.origin(), Origin::Imported);
        assert_eq!(imported.executive_summary().conclusions, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(imported.source_analysis()["https://a.example"].expertise, "blog");
        assert_eq!(&renormalized(&imported), imported.sections());
    }
}
