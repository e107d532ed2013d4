//! Data models for linkshell item metadata.

use serde::{Deserialize, Serialize};

/// Database model for the items table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub item_id: i32,
    pub name: String,
    pub flags: i32,
    pub is_rare: bool,
    pub is_exclusive: bool,
}

/// One row of an exported item dataset (CSV import).
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    pub item_id: i32,
    pub name: String,
    #[serde(default)]
    pub flags: i32,
}

/// Tooltip data reconstructed from one wiki page, before formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTooltip {
    pub lines: Vec<String>,
    pub hidden_effects: Vec<String>,
    pub description: String,
}

impl RawTooltip {
    /// True when the page carried nothing worth storing.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.hidden_effects.is_empty() && self.description.is_empty()
    }
}

/// Database model for the item_wiki_tooltips table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedTooltip {
    pub item_id: i32,
    pub tooltip_lines: Vec<String>,
    pub hidden_effects: Vec<String>,
    pub description: String,
    pub source_url: String,
    pub scraped_at: String,
}

/// Page body plus the URL of the candidate title that resolved.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub url: String,
}

/// Which items a scrape batch should cover.
#[derive(Debug, Clone)]
pub enum ItemSelection {
    /// Items with no stored tooltip record.
    MissingTooltips,
    /// Items referenced as the target of a conversion.
    ConversionTargets,
    /// An explicit list of internal item names.
    Named(Vec<String>),
}
