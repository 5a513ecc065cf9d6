use chrono::Local;
use tracing::trace;

use super::{Context, ExecutiveSummary, Origin, Recommendations, Report, ReportSections, SourceRecord};

/// Assembles a [`Report`] one section at a time.
///
/// Inputs are expected to be normalized already; nothing here validates.
#[derive(Debug)]
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    pub fn new(query: impl Into<String>, origin: Origin) -> Self {
        ReportBuilder {
            report: Report {
                query: query.into(),
                origin,
                sections: ReportSections::default(),
            },
        }
    }

    /// Build a report from an already normalized section mapping.
    ///
    /// Findings are re-added pairwise: the i-th theme with the i-th opposing
    /// view, the first finding carrying all of the evidence. Sources keep
    /// their publication date; undated ones are stamped with today's.
    pub fn from_sections(query: impl Into<String>, origin: Origin, sections: ReportSections) -> Report {
        let ReportSections {
            executive_summary,
            detailed_findings,
            source_analysis,
            context,
            recommendations,
        } = sections;

        let mut b = ReportBuilder::new(query, origin);
        b.set_executive_summary(
            executive_summary.overview,
            executive_summary.highlights,
            executive_summary.conclusions,
        );

        let mut themes = detailed_findings.themes.into_iter();
        let mut opposing = detailed_findings.opposing_views.into_iter();
        let mut evidence = Some(detailed_findings.evidence).filter(|e| !e.is_empty());
        loop {
            let theme = themes.next();
            let view = opposing.next();
            if theme.is_none() && view.is_none() && evidence.is_none() {
                break;
            }
            b.push_finding(theme, evidence.take().unwrap_or_default(), view);
        }

        for (url, mut source) in source_analysis {
            if source.publication_date.is_empty() {
                source.publication_date = today();
            }
            b.insert_source(url, source);
        }

        b.set_context(context.historical, context.current, context.future, context.impacts);
        b.set_recommendations(
            recommendations.actions,
            recommendations.research,
            recommendations.risks,
            recommendations.strategy,
        );
        b.build()
    }

    pub fn set_executive_summary(&mut self, overview: String, highlights: Vec<String>, conclusions: Vec<String>) {
        self.report.sections.executive_summary = ExecutiveSummary {
            overview,
            highlights,
            conclusions,
        };
    }

    /// Append one finding. An empty opposing view is not recorded.
    pub fn add_detailed_finding(
        &mut self,
        theme: impl Into<String>,
        evidence: Vec<String>,
        opposing_view: Option<String>,
    ) {
        self.push_finding(Some(theme.into()), evidence, opposing_view.filter(|v| !v.is_empty()));
    }

    fn push_finding(&mut self, theme: Option<String>, evidence: Vec<String>, opposing_view: Option<String>) {
        let findings = &mut self.report.sections.detailed_findings;
        findings.themes.extend(theme);
        findings.evidence.extend(evidence);
        findings.opposing_views.extend(opposing_view);
    }

    /// Record a source under `url`, replacing any earlier record for it.
    pub fn add_source(&mut self, url: impl Into<String>, credibility: u8, expertise: impl Into<String>, citations: u32) {
        let record = SourceRecord {
            reliability_score: credibility,
            expertise: expertise.into(),
            citations,
            publication_date: today(),
        };
        self.insert_source(url.into(), record);
    }

    fn insert_source(&mut self, url: String, record: SourceRecord) {
        if self.report.sections.source_analysis.insert(url.clone(), record).is_some() {
            trace!(%url, "source record replaced");
        }
    }

    pub fn set_context(&mut self, historical: String, current: String, future: String, impacts: Vec<String>) {
        self.report.sections.context = Context {
            historical,
            current,
            future,
            impacts,
        };
    }

    pub fn set_recommendations(
        &mut self,
        actions: Vec<String>,
        research: Vec<String>,
        risks: Vec<String>,
        strategy: Vec<String>,
    ) {
        self.report.sections.recommendations = Recommendations {
            actions,
            research,
            risks,
            strategy,
        };
    }

    pub fn build(self) -> Report {
        self.report
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
