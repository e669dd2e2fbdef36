use crate::extract::Fingerprint;
use serde::{Deserialize, Serialize};

/// One structural item of a content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Paragraph { text: String },
    List { ordered: bool, items: Vec<String> },
    Table { rows: Vec<Vec<String>> },
}

impl ContentItem {
    /// Text the fingerprint is computed over
    pub fn fingerprint_text(&self) -> String {
        match self {
            Self::Paragraph { text } => text.clone(),
            Self::List { items, .. } => items.join("\n"),
            Self::Table { rows } => rows
                .iter()
                .map(|row| row.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.fingerprint_text())
    }
}

/// Items following one heading, up to the next heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    /// 1 to 5 for `h1`..`h5`; None for the implicit block named after the section
    pub level: Option<u8>,
    pub items: Vec<ContentItem>,
}

impl ContentBlock {
    pub fn new(heading: impl Into<String>, level: Option<u8>) -> Self {
        Self {
            heading: heading.into(),
            level,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Content of one scraped section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub url: String,
    pub blocks: Vec<ContentBlock>,
}

/// Fully assembled article, handed over to the rendering side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    /// Never empty; holds a single placeholder entry when no author was found
    pub authors: Vec<String>,
    pub last_updated: String,
    /// Sections that yielded content, in section-map order
    pub sections: Vec<Section>,
    /// Sections that were mapped but yielded nothing
    pub failed_sections: Vec<String>,
    pub sections_found: usize,
    pub sections_scraped: usize,
    pub total_content_blocks: usize,
}

impl ArticleRecord {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Every item of every section, in order
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.sections
            .iter()
            .flat_map(|s| s.blocks.iter())
            .flat_map(|b| b.items.iter())
    }
}
