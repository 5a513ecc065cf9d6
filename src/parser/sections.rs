use tracing::{debug, trace};

use super::lines::{self, Line, SourceField};
use crate::normalize::partial::{PartialReport, SourceEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ExecutiveSummary,
    DetailedFindings,
    SourceAnalysis,
    Context,
    Recommendations,
}

impl Section {
    pub fn key(self) -> &'static str {
        match self {
            Section::ExecutiveSummary => "executive_summary",
            Section::DetailedFindings => "detailed_findings",
            Section::SourceAnalysis => "source_analysis",
            Section::Context => "context",
            Section::Recommendations => "recommendations",
        }
    }

    /// Field that receives every bullet in this section, whatever the sub-header.
    fn bullet_sink(self) -> Option<Field> {
        match self {
            Section::Context => Some(Field::Impacts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Overview,
    Highlights,
    Conclusions,
    Themes,
    Evidence,
    OpposingViews,
    Patterns,
    Historical,
    Current,
    Future,
    Impacts,
    Actions,
    Research,
    Risks,
    Strategy,
}

impl Field {
    pub fn is_text(self) -> bool {
        matches!(self, Field::Overview | Field::Historical | Field::Current | Field::Future)
    }
}

pub const SECTION_MARKERS: &[(&str, Section)] = &[
    ("1. EXECUTIVE SUMMARY", Section::ExecutiveSummary),
    ("2. DETAILED FINDINGS", Section::DetailedFindings),
    ("3. SOURCE ANALYSIS", Section::SourceAnalysis),
    ("4. CONTEXTUAL ANALYSIS", Section::Context),
    ("5. RECOMMENDATIONS", Section::Recommendations),
];

/// Sub-header phrase → field, scoped to the section it may appear in.
pub const SUBHEADERS: &[(Section, &str, Field)] = &[
    (Section::ExecutiveSummary, "Overview:", Field::Overview),
    (Section::ExecutiveSummary, "Key Highlights:", Field::Highlights),
    (Section::ExecutiveSummary, "Main Conclusions:", Field::Conclusions),
    (Section::DetailedFindings, "Major Themes", Field::Themes),
    (Section::DetailedFindings, "Supporting evidence", Field::Evidence),
    (Section::DetailedFindings, "Opposing Viewpoints", Field::OpposingViews),
    (Section::DetailedFindings, "Emerging Patterns", Field::Patterns),
    (Section::Context, "Historical Background:", Field::Historical),
    (Section::Context, "Current Landscape:", Field::Current),
    (Section::Context, "Future Implications:", Field::Future),
    (Section::Recommendations, "Actionable Insights", Field::Actions),
    (Section::Recommendations, "Research Gaps", Field::Research),
    (Section::Recommendations, "Risk Assessment", Field::Risks),
    (Section::Recommendations, "Strategic Considerations", Field::Strategy),
];

pub fn subheader(section: Section, line: &str) -> Option<Field> {
    SUBHEADERS
        .iter()
        .find(|(s, phrase, _)| *s == section && line.contains(phrase))
        .map(|&(_, _, field)| field)
}

/// Single-pass state machine from analysis lines to a partial report.
#[derive(Debug, Default)]
pub struct SectionParser {
    section: Option<Section>,
    field: Option<Field>,
    pending: Option<SourceEntry>,
    out: PartialReport,
}

impl SectionParser {
    pub fn new() -> Self {
        SectionParser::default()
    }

    pub fn feed(&mut self, raw: &str) {
        match lines::classify(raw) {
            Line::Blank => {}
            Line::Marker(section) => self.enter(section),
            Line::Content(line) => match self.section {
                None => trace!(line, "outside any section"),
                Some(Section::SourceAnalysis) => self.source_line(line),
                Some(section) => self.section_line(section, line),
            },
        }
    }

    pub fn finish(mut self) -> PartialReport {
        self.flush_source();
        self.out
    }

    fn enter(&mut self, section: Section) {
        self.flush_source();
        debug!(section = section.key(), "section marker");
        match section {
            Section::ExecutiveSummary => self.out.executive_summary = Some(Default::default()),
            Section::DetailedFindings => self.out.detailed_findings = Some(Default::default()),
            Section::SourceAnalysis => self.out.source_analysis = Some(Vec::new()),
            Section::Context => self.out.context = Some(Default::default()),
            Section::Recommendations => self.out.recommendations = Some(Default::default()),
        }
        self.section = Some(section);
        self.field = None;
    }

    fn section_line(&mut self, section: Section, line: &str) {
        if let Some(field) = subheader(section, line) {
            self.field = Some(field);
            return;
        }

        if let Some(item) = lines::bullet_item(line) {
            let target = section.bullet_sink().or(self.field.filter(|f| !f.is_text()));
            match target.and_then(|f| self.list_mut(f)) {
                Some(list) => list.push(item.to_string()),
                None => trace!(line, "bullet without list field"),
            }
            return;
        }

        match self.field.filter(|f| f.is_text()).and_then(|f| self.text_mut(f)) {
            Some(text) => {
                text.push_str(line);
                text.push(' ');
            }
            None => trace!(line, "prose without text field"),
        }
    }

    fn source_line(&mut self, line: &str) {
        let Some((field, value)) = lines::source_field(line) else {
            trace!(line, "not a source field");
            return;
        };
        if field == SourceField::Url {
            self.flush_source();
        }
        let entry = self.pending.get_or_insert_with(SourceEntry::default);
        match field {
            SourceField::Url => entry.url = value.to_string(),
            SourceField::Credibility => entry.reliability_score = crate::normalize::partial::reliability_from_text(value),
            SourceField::Expertise => entry.expertise = Some(value.to_string()),
            SourceField::Bias => entry.reasoning = Some(value.to_string()),
        }
    }

    fn flush_source(&mut self) {
        if let Some(entry) = self.pending.take() {
            debug!(url = %entry.url, score = entry.reliability_score, "source record");
            self.out.source_analysis.get_or_insert_with(Vec::new).push(entry);
        }
    }

    fn list_mut(&mut self, field: Field) -> Option<&mut Vec<String>> {
        let out = &mut self.out;
        Some(match field {
            Field::Highlights => &mut out.executive_summary.get_or_insert_with(Default::default).highlights,
            Field::Conclusions => &mut out.executive_summary.get_or_insert_with(Default::default).conclusions,
            Field::Themes => &mut out.detailed_findings.get_or_insert_with(Default::default).themes,
            Field::Evidence => &mut out.detailed_findings.get_or_insert_with(Default::default).evidence,
            Field::OpposingViews => &mut out.detailed_findings.get_or_insert_with(Default::default).opposing_views,
            Field::Patterns => &mut out.detailed_findings.get_or_insert_with(Default::default).patterns,
            Field::Impacts => &mut out.context.get_or_insert_with(Default::default).impacts,
            Field::Actions => &mut out.recommendations.get_or_insert_with(Default::default).actions,
            Field::Research => &mut out.recommendations.get_or_insert_with(Default::default).research,
            Field::Risks => &mut out.recommendations.get_or_insert_with(Default::default).risks,
            Field::Strategy => &mut out.recommendations.get_or_insert_with(Default::default).strategy,
            Field::Overview | Field::Historical | Field::Current | Field::Future => return None,
        })
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let out = &mut self.out;
        Some(match field {
            Field::Overview => &mut out.executive_summary.get_or_insert_with(Default::default).overview,
            Field::Historical => &mut out.context.get_or_insert_with(Default::default).historical,
            Field::Current => &mut out.context.get_or_insert_with(Default::default).current,
            Field::Future => &mut out.context.get_or_insert_with(Default::default).future,
            _ => return None,
        })
    }
}
