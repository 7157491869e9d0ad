//! Section Segmenter: splits cleaned résumé text into named sections.

use serde::Serialize;
use tracing::debug;

use crate::parsing::headings::is_section_heading;

/// Name of the implicit section holding everything before the first heading.
pub const HEADER_SECTION: &str = "header";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub body: String,
}

/// Ordered mapping of lower-cased section label → body text.
///
/// A label seen twice (e.g. two `EXPERIENCE` headings) keeps its first position
/// and the later body is appended, so no source line is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionMap {
    sections: Vec<Section>,
}

impl SectionMap {
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.body.as_str())
    }

    pub fn names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    fn insert(&mut self, name: String, body: String) {
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                if !body.is_empty() {
                    if !existing.body.is_empty() {
                        existing.body.push('\n');
                    }
                    existing.body.push_str(&body);
                }
            }
            None => self.sections.push(Section { name, body }),
        }
    }
}

/// Scans lines top to bottom, starting a new section at every heading line.
///
/// A section is recorded only if at least one line followed its heading, so a
/// heading immediately followed by another heading contributes no entry. Text with
/// no headings yields a single `"header"` section holding the whole input.
pub fn segment_sections(text: &str) -> SectionMap {
    let mut map = SectionMap::default();
    let mut current = HEADER_SECTION.to_string();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if is_section_heading(line) {
            if !lines.is_empty() {
                map.insert(current, lines.join("\n").trim().to_string());
            }
            current = line.trim().to_lowercase();
            lines = Vec::new();
        } else {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        map.insert(current, lines.join("\n").trim().to_string());
    }

    debug!("Found {} sections: {:?}", map.len(), map.names());
    map
}
