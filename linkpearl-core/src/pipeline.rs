//! Batch driver for wiki tooltip scraping.
//!
//! Items are processed strictly one at a time with a fixed delay between
//! them; the wiki is a shared community resource, not an API. One item's
//! failure never aborts the run: every outcome is tallied and reported at
//! the end.

use std::time::Duration;

use scraper::Html;
use tracing::{info, warn};

use crate::database::Database;
use crate::error::Result;
use crate::fetch::WikiClient;
use crate::format;
use crate::models::{Item, ItemSelection, RawTooltip};
use crate::{extract, naming};

/// Outcome of one item's scrape attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    /// Parsed data was persisted.
    Scraped { lines: usize },
    /// No wiki page resolved for any candidate title.
    PageNotFound,
    /// A page resolved but carried nothing extractable.
    NoData,
    /// The fetch or the database write failed.
    Failed { error: String },
}

/// End-of-run tallies.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScrapeSummary {
    pub total: usize,
    pub scraped: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ScrapeSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, outcome: &ScrapeOutcome) {
        self.total += 1;
        match outcome {
            ScrapeOutcome::Scraped { .. } => self.scraped += 1,
            ScrapeOutcome::PageNotFound | ScrapeOutcome::NoData => self.skipped += 1,
            ScrapeOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Knobs for one batch run.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Pause between items.
    pub delay: Duration,
    /// Cap on how many items to process this run.
    pub limit: Option<usize>,
    /// Quiet mode (0=show messages/warnings, 1=suppress messages, 2=suppress both)
    pub quiet: u8,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            limit: None,
            quiet: 0,
        }
    }
}

/// Scrape tooltips for every item the selection yields, sequentially.
pub async fn scrape_tooltips(
    db: &Database,
    client: &WikiClient,
    selection: &ItemSelection,
    options: &ScrapeOptions,
) -> Result<ScrapeSummary> {
    let mut items = db.select_items(selection)?;
    if let Some(limit) = options.limit {
        items.truncate(limit);
    }

    if options.quiet == 0 {
        info!("Found {} items to process", items.len());
    }

    let mut summary = ScrapeSummary::new();
    let total = items.len();

    for (index, item) in items.iter().enumerate() {
        let outcome = scrape_item(db, client, item).await;

        match &outcome {
            ScrapeOutcome::Scraped { lines } => {
                if options.quiet == 0 {
                    info!("[{}/{}] {}: stored {} tooltip lines", index + 1, total, item.name, lines);
                }
            }
            ScrapeOutcome::PageNotFound => {
                if options.quiet == 0 {
                    info!("[{}/{}] {}: no wiki page found", index + 1, total, item.name);
                }
            }
            ScrapeOutcome::NoData => {
                if options.quiet == 0 {
                    info!("[{}/{}] {}: no tooltip data on page", index + 1, total, item.name);
                }
            }
            ScrapeOutcome::Failed { error } => {
                if options.quiet < 2 {
                    warn!("[{}/{}] {} failed: {}", index + 1, total, item.name, error);
                }
            }
        }

        summary.add(&outcome);

        if index + 1 < total {
            tokio::time::sleep(options.delay).await;
        }
    }

    if options.quiet == 0 {
        info!(
            "Scrape complete: {} stored, {} skipped, {} failed of {} items",
            summary.scraped, summary.skipped, summary.failed, summary.total
        );
    }

    Ok(summary)
}

async fn scrape_item(db: &Database, client: &WikiClient, item: &Item) -> ScrapeOutcome {
    let candidates = naming::wiki_title_candidates(&item.name);

    let page = match client.fetch_first(&candidates).await {
        Ok(Some(page)) => page,
        Ok(None) => return ScrapeOutcome::PageNotFound,
        Err(error) => {
            return ScrapeOutcome::Failed {
                error: error.to_string(),
            };
        }
    };

    let raw = match parse_page(&page.html) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return ScrapeOutcome::NoData,
    };

    let lines = format::format_lines(&raw.lines);

    match db.upsert_tooltip(
        item.item_id,
        &lines,
        &raw.hidden_effects,
        &raw.description,
        &page.url,
    ) {
        Ok(()) => ScrapeOutcome::Scraped { lines: lines.len() },
        Err(error) => ScrapeOutcome::Failed {
            error: error.to_string(),
        },
    }
}

/// Parse one page body into raw tooltip data. `None` when the page has no
/// Statistics section.
pub fn parse_page(html: &str) -> Option<RawTooltip> {
    let document = Html::parse_document(html);
    extract::extract_tooltip(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAIDATE_PAGE: &str = r#"<html><body>
        <h2><span id="Statistics" class="mw-headline">Statistics</span></h2>
        <div style="display:table; width:100%">
          <div style="display:table-cell; width:40px"><img src="icon.png"></div>
          <div style="display:table-cell; vertical-align:top">
            <div><b>Byakko's Haidate</b> <span><img alt="Rare"><img alt="Exclusive"></span></div>
            <div>[Legs] All Races<br>DEF: 42 DEX +15<br>Haste +5%</div>
            <div>Lv. 75 MNK / SAM / NIN</div>
          </div>
        </div>
        <p><b>Hidden Effect</b></p>
        <ul><li>Increases movement speed at night</li></ul>
        <h2><span id="How_to_Obtain">How to Obtain</span></h2>
        </body></html>"#;

    #[test]
    fn test_parse_page_reconstructs_lines() {
        let raw = parse_page(HAIDATE_PAGE).unwrap();
        assert_eq!(
            raw.lines,
            vec!["[Legs] All Races", "DEF: 42 DEX +15", "Haste +5%", "Lv. 75 MNK / SAM / NIN"]
        );
        assert_eq!(raw.hidden_effects, vec!["Increases movement speed at night"]);
    }

    #[test]
    fn test_parse_then_format_matches_client_spacing() {
        let raw = parse_page(HAIDATE_PAGE).unwrap();
        let formatted = format::format_lines(&raw.lines);
        assert_eq!(
            formatted,
            vec!["[Legs]All Races", "DEF:42 DEX+15", "Haste+5%", "Lv.75 MNK/SAM/NIN"]
        );
    }

    #[test]
    fn test_parse_page_without_statistics() {
        assert!(parse_page("<html><body><p>nothing</p></body></html>").is_none());
    }

    #[test]
    fn test_summary_classification() {
        let mut summary = ScrapeSummary::new();
        summary.add(&ScrapeOutcome::Scraped { lines: 4 });
        summary.add(&ScrapeOutcome::PageNotFound);
        summary.add(&ScrapeOutcome::NoData);
        summary.add(&ScrapeOutcome::Failed {
            error: "connection reset".to_string(),
        });

        assert_eq!(summary.total, 4);
        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 1);
    }
}
