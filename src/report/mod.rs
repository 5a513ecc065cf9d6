pub mod builder;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::ReportBuilder;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overview: String,
    pub highlights: Vec<String>,
    pub conclusions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedFindings {
    pub themes: Vec<String>,
    pub evidence: Vec<String>,
    pub opposing_views: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub reliability_score: u8,
    pub expertise: String,
    pub citations: u32,
    pub publication_date: String,
}

/// Source URL → record. Ordered by URL, not by insertion.
pub type SourceAnalysis = BTreeMap<String, SourceRecord>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub historical: String,
    pub current: String,
    pub future: String,
    pub impacts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub actions: Vec<String>,
    pub research: Vec<String>,
    pub risks: Vec<String>,
    pub strategy: Vec<String>,
}

/// The normalized five-section mapping. Every section is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSections {
    pub executive_summary: ExecutiveSummary,
    pub detailed_findings: DetailedFindings,
    pub source_analysis: SourceAnalysis,
    pub context: Context,
    pub recommendations: Recommendations,
}

/// How a report was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    #[default]
    Analysis,
    Fallback,
    Imported,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Analysis => "analysis",
            Origin::Fallback => "fallback",
            Origin::Imported => "imported",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finished research report. Only [`ReportBuilder`] can change one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    query: String,
    origin: Origin,
    #[serde(flatten)]
    sections: ReportSections,
}

impl Report {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn sections(&self) -> &ReportSections {
        &self.sections
    }

    pub fn executive_summary(&self) -> &ExecutiveSummary {
        &self.sections.executive_summary
    }

    pub fn detailed_findings(&self) -> &DetailedFindings {
        &self.sections.detailed_findings
    }

    pub fn source_analysis(&self) -> &SourceAnalysis {
        &self.sections.source_analysis
    }

    pub fn context(&self) -> &Context {
        &self.sections.context
    }

    pub fn recommendations(&self) -> &Recommendations {
        &self.sections.recommendations
    }

    /// Names of the sections that carry no content at all.
    ///
    /// An empty section usually means the upstream text did not follow the
    /// expected layout rather than that nothing was found.
    pub fn empty_sections(&self) -> Vec<&'static str> {
        let s = &self.sections;
        let mut empty = Vec::new();
        if s.executive_summary == ExecutiveSummary::default() {
            empty.push("executive_summary");
        }
        if s.detailed_findings == DetailedFindings::default() {
            empty.push("detailed_findings");
        }
        if s.source_analysis.is_empty() {
            empty.push("source_analysis");
        }
        if s.context == Context::default() {
            empty.push("context");
        }
        if s.recommendations == Recommendations::default() {
            empty.push("recommendations");
        }
        empty
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.sections;
        write!(
            f,
            "Report {{ query: {:?}, origin: {}, highlights: {}, themes: {}, sources: {}, actions: {} }}",
            self.query,
            self.origin,
            s.executive_summary.highlights.len(),
            s.detailed_findings.themes.len(),
            s.source_analysis.len(),
            s.recommendations.actions.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sections_serialize_with_five_keys() {
        let v = serde_json::to_value(ReportSections::default()).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(v["executive_summary"]["overview"], "");
        assert!(v["source_analysis"].as_object().unwrap().is_empty());
        assert!(v["context"]["impacts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn report_serializes_flat() {
        let report = ReportBuilder::new("rust", Origin::Fallback).build();
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["query"], "rust");
        assert_eq!(v["origin"], "fallback");
        assert!(v.get("executive_summary").is_some());
        assert!(v.get("sections").is_none());
    }

    #[test]
    fn empty_report_lists_every_section() {
        let report = ReportBuilder::new("", Origin::Analysis).build();
        assert_eq!(report.empty_sections().len(), 5);
    }

    #[test]
    fn display_counts() {
        let mut b = ReportBuilder::new("q", Origin::Analysis);
        b.add_detailed_finding("Theme", vec![], None);
        let text = b.build().to_string();
        assert!(text.contains("themes: 1"));
        assert!(text.contains("origin: analysis"));
    }
}
