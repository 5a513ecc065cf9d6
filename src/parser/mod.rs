pub mod lines;
pub mod sections;

use crate::normalize::partial::PartialReport;
use sections::SectionParser;

/// Two-stage pipeline: classify each line → fold through the section state machine.
pub fn parse_sections(text: &str) -> PartialReport {
    let mut parser = SectionParser::new();
    for line in text.lines() {
        parser.feed(line);
    }
    parser.finish()
}

// ── Tests ──
