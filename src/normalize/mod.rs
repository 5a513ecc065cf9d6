pub mod legacy;
pub mod partial;

use serde_json::Value;
use tracing::debug;

use crate::report::{DetailedFindings, ReportSections, SourceAnalysis, SourceRecord};
use legacy::LegacyReport;
use partial::{PartialReport, SourceEntry};

/// A report-like value after its format has been decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportInput {
    Legacy(LegacyReport),
    Canonical(PartialReport),
}

impl ReportInput {
    pub fn decode(value: &Value) -> Self {
        match value.as_object() {
            Some(obj) if LegacyReport::detect(obj) => ReportInput::Legacy(LegacyReport::from_object(obj)),
            _ => ReportInput::Canonical(PartialReport::from_value(value)),
        }
    }
}

/// Normalize any report-like JSON value into the five-section mapping.
pub fn normalize_value(value: &Value) -> ReportSections {
    normalize(ReportInput::decode(value))
}

pub fn normalize(input: ReportInput) -> ReportSections {
    match input {
        ReportInput::Legacy(legacy) => {
            debug!(findings = legacy.key_findings.len(), sources = legacy.sources.len(), "legacy report format");
            normalize_partial(legacy.into_partial())
        }
        ReportInput::Canonical(partial) => {
            debug!("canonical report format");
            normalize_partial(partial)
        }
    }
}

/// Fill every missing section with its empty default.
pub fn normalize_partial(partial: PartialReport) -> ReportSections {
    let findings = partial.detailed_findings.unwrap_or_default();
    ReportSections {
        executive_summary: partial.executive_summary.unwrap_or_default(),
        detailed_findings: DetailedFindings {
            themes: findings.themes,
            evidence: findings.evidence,
            opposing_views: findings.opposing_views,
        },
        source_analysis: merge_sources(partial.source_analysis.unwrap_or_default()),
        context: partial.context.unwrap_or_default(),
        recommendations: partial.recommendations.unwrap_or_default(),
    }
}

/// Key entries by URL; a later entry for the same URL replaces the earlier one.
fn merge_sources(entries: Vec<SourceEntry>) -> SourceAnalysis {
    let mut merged = SourceAnalysis::new();
    for entry in entries {
        let expertise = entry.expertise.or(entry.reasoning).unwrap_or_default();
        merged.insert(
            entry.url,
            SourceRecord {
                reliability_score: entry.reliability_score,
                expertise,
                citations: entry.citations,
                publication_date: entry.publication_date,
            },
        );
    }
    merged
}
