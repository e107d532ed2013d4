//! Wiki page retrieval with candidate-title fallback.

use crate::error::{LinkpearlError, Result};
use crate::models::FetchedPage;

/// Base URL of the item wiki; candidate titles are appended as path segments.
pub const WIKI_BASE_URL: &str = "https://ffxiclopedia.fandom.com/wiki";

/// The wiki serves a reduced page skeleton to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct WikiClient {
    client: reqwest::Client,
    base_url: String,
}

impl WikiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(WIKI_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Try candidate titles strictly in order, one request each. A 404 moves
    /// on to the next candidate; any other failure is propagated immediately.
    /// `Ok(None)` means every candidate was missing, which is an ordinary
    /// outcome for items the wiki has no page for.
    pub async fn fetch_first(&self, candidates: &[String]) -> Result<Option<FetchedPage>> {
        for title in candidates {
            let url = format!("{}/{}", self.base_url, title);
            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND {
                tracing::debug!("No page at {}", url);
                continue;
            }
            if !status.is_success() {
                return Err(LinkpearlError::Http {
                    status: status.as_u16(),
                    url,
                });
            }

            let html = response.text().await?;
            return Ok(Some(FetchedPage { html, url }));
        }

        Ok(None)
    }
}
