use serde::{Deserialize, Serialize};

use crate::normalize::partial::{PartialFindings, PartialReport, SourceEntry};
use crate::report::{Context, ExecutiveSummary, Recommendations};

const MAX_HIGHLIGHTS: usize = 5;
const MAX_THEMES: usize = 5;
const DEFAULT_RELIABILITY: u8 = 70;

pub const NO_CONTENT: &str = "No content found to analyze";

/// One search hit as handed over by the retrieval step.
///
/// Raw search APIs name the URL `link`; both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRecord {
    pub title: String,
    #[serde(alias = "link")]
    pub url: String,
    pub snippet: String,
    pub position: i64,
}

/// Template report built straight from search hits, no model involved.
pub fn synthesize(query: &str, records: &[ContentRecord]) -> PartialReport {
    if records.is_empty() {
        return no_content();
    }

    let n = records.len();
    let snippets: Vec<String> = records
        .iter()
        .filter(|r| !r.snippet.is_empty())
        .map(|r| r.snippet.clone())
        .collect();
    let themes: Vec<String> = records
        .iter()
        .filter(|r| !r.title.is_empty())
        .take(MAX_THEMES)
        .map(|r| r.title.clone())
        .collect();
    let sources = records
        .iter()
        .map(|r| SourceEntry {
            url: r.url.clone(),
            reliability_score: DEFAULT_RELIABILITY,
            reasoning: Some("Basic credibility assessment".to_string()),
            ..Default::default()
        })
        .collect();

    PartialReport {
        executive_summary: Some(ExecutiveSummary {
            overview: format!("Basic analysis of {} sources about '{}'", n, query),
            highlights: snippets.iter().take(MAX_HIGHLIGHTS).cloned().collect(),
            conclusions: vec![
                format!("Found {} relevant sources", n),
                "Basic analysis provided due to AI service unavailability".to_string(),
            ],
        }),
        detailed_findings: Some(PartialFindings {
            themes,
            evidence: snippets,
            ..Default::default()
        }),
        source_analysis: Some(sources),
        context: Some(Context {
            current: "Analysis performed without AI assistance".to_string(),
            ..Default::default()
        }),
        recommendations: Some(Recommendations {
            actions: vec!["Try again later for AI-powered analysis".to_string()],
            research: vec!["Review sources manually".to_string()],
            risks: vec!["Limited analysis depth".to_string()],
            strategy: vec!["Focus on source content review".to_string()],
        }),
    }
}

fn no_content() -> PartialReport {
    PartialReport {
        executive_summary: Some(ExecutiveSummary {
            overview: NO_CONTENT.to_string(),
            ..Default::default()
        }),
        detailed_findings: Some(PartialFindings::default()),
        source_analysis: Some(Vec::new()),
        context: Some(Context::default()),
        recommendations: Some(Recommendations::default()),
    }
}
