use std::sync::LazyLock;

use regex::Regex;

use super::sections::{Section, SECTION_MARKERS};

static SOURCE_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(URL|Credibility Score|Expertise Level|Bias Assessment):(.*)$").unwrap());

/// One input line, classified without looking at parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Marker(Section),
    Content(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceField {
    Url,
    Credibility,
    Expertise,
    Bias,
}

pub fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    match SECTION_MARKERS.iter().find(|(marker, _)| line.contains(marker)) {
        Some(&(_, section)) => Line::Marker(section),
        None => Line::Content(line),
    }
}

/// The item text of a `*` / `-` bullet, markers stripped from both ends.
pub fn bullet_item(line: &str) -> Option<&str> {
    if line.starts_with('*') || line.starts_with('-') {
        Some(line.trim_matches(|c: char| c == '*' || c == '-' || c.is_whitespace()))
    } else {
        None
    }
}

/// A `Prefix: value` line of a source record.
pub fn source_field(line: &str) -> Option<(SourceField, &str)> {
    let caps = SOURCE_FIELD_RE.captures(line)?;
    let field = match caps.get(1)?.as_str() {
        "URL" => SourceField::Url,
        "Credibility Score" => SourceField::Credibility,
        "Expertise Level" => SourceField::Expertise,
        _ => SourceField::Bias,
    };
    let value = caps.get(2)?.as_str().trim();
    let value = match field {
        SourceField::Credibility => value.trim_end_matches(|c: char| c == '%' || c.is_whitespace()),
        _ => value,
    };
    Some((field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace() {
        assert_eq!(classify(""), Line::Blank);
        assert_eq!(classify("   \t"), Line::Blank);
    }

    #[test]
    fn markers_match_anywhere_in_line() {
        assert_eq!(classify("## 1. EXECUTIVE SUMMARY"), Line::Marker(Section::ExecutiveSummary));
        assert_eq!(classify("**3. SOURCE ANALYSIS**"), Line::Marker(Section::SourceAnalysis));
        assert_eq!(classify("4. CONTEXTUAL ANALYSIS"), Line::Marker(Section::Context));
        assert_eq!(classify("1. Executive Summary"), Line::Content("1. Executive Summary"));
    }

    #[test]
    fn content_is_trimmed() {
        assert_eq!(classify("   hello  "), Line::Content("hello"));
    }

    #[test]
    fn bullets() {
        assert_eq!(bullet_item("- Alpha"), Some("Alpha"));
        assert_eq!(bullet_item("* **Bold** "), Some("Bold"));
        assert_eq!(bullet_item("-"), Some(""));
        assert_eq!(bullet_item("Plain"), None);
        assert_eq!(bullet_item("1. Numbered"), None);
    }

    #[test]
    fn source_fields() {
        assert_eq!(source_field("URL: https://a.example"), Some((SourceField::Url, "https://a.example")));
        assert_eq!(source_field("Credibility Score: 85 %"), Some((SourceField::Credibility, "85")));
        assert_eq!(source_field("Expertise Level: High"), Some((SourceField::Expertise, "High")));
        assert_eq!(source_field("Bias Assessment:"), Some((SourceField::Bias, "")));
        assert_eq!(source_field("- URL: https://a.example"), None);
        assert_eq!(source_field("Publication Impact: wide"), None);
    }
}
