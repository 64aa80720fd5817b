//! Browser-driven access to odmp.org.
//!
//! The browse pages are an Angular app: officer cards (`mat-card`) are
//! rendered client-side and paginated with a Material paginator, so they are
//! read through a live Chromium tab rather than plain HTTP.

use super::directory::{DirectoryListing, DirectorySite};
use crate::error::{SourceError, SourceResult};
use crate::renderer::{BrowserSession, RenderContext};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Public ODMP site.
pub const ODMP_BASE_URL: &str = "https://www.odmp.org";

const CARD_SELECTOR: &str = "mat-card";
const ELEMENT_WAIT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(250);
const PAGE_SETTLE: Duration = Duration::from_secs(2);

/// Name and link of every card on the current browse page.
const READ_CARDS_JS: &str = r#"
Array.from(document.querySelectorAll('mat-card')).map((card) => {
  const link = card.querySelector('a[href*="/officer/"]') || card.closest('a[href*="/officer/"]');
  const title = card.querySelector('mat-card-title, h1, h2, h3, h4');
  const text = title ? title.innerText : (card.innerText || '').split('\n')[0];
  return { name: (text || '').trim(), href: link ? link.href : null };
})
"#;

/// Clicks the paginator's next button. Returns `false` on the last page.
const NEXT_PAGE_JS: &str = r#"
(() => {
  const next = document.querySelector('button.mat-paginator-navigation-next');
  if (!next || next.disabled || next.className.includes('mat-button-disabled')) return false;
  next.scrollIntoView();
  next.click();
  return true;
})()
"#;

#[derive(Debug, Deserialize)]
struct CardInfo {
    name: String,
    href: Option<String>,
}

/// [`DirectorySite`] backed by a Chromium tab.
pub struct BrowserDirectory {
    session: BrowserSession,
    base_url: String,
    timeout_ms: u64,
    element_wait: Duration,
    page_settle: Duration,
}

impl BrowserDirectory {
    pub fn new(session: BrowserSession, timeout_ms: u64) -> Self {
        Self::with_base_url(session, ODMP_BASE_URL, timeout_ms)
    }

    pub fn with_base_url(session: BrowserSession, base_url: &str, timeout_ms: u64) -> Self {
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
            element_wait: ELEMENT_WAIT,
            page_settle: PAGE_SETTLE,
        }
    }

    /// How long to wait for elements to render, and for a page to settle
    /// after pagination or a click-through.
    pub fn with_waits(mut self, element_wait: Duration, page_settle: Duration) -> Self {
        self.element_wait = element_wait;
        self.page_settle = page_settle;
        self
    }

    pub fn browse_url(&self, state: &str) -> String {
        format!("{}/search/browse/{}", self.base_url, state)
    }
}

#[async_trait]
impl DirectorySite for BrowserDirectory {
    async fn list_officers(&mut self, state: &str) -> SourceResult<Vec<DirectoryListing>> {
        let start_url = self.browse_url(state);
        let (timeout_ms, element_wait, page_settle) =
            (self.timeout_ms, self.element_wait, self.page_settle);
        let ctx = self.session.context()?;
        let nav = ctx.navigate(&start_url, timeout_ms).await?;
        tracing::debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);

        let mut officers = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page_number = 1;

        loop {
            tracing::info!("scanning ODMP browse page {page_number}");
            if !wait_for_selector(ctx, CARD_SELECTOR, element_wait).await? {
                break;
            }

            let cards: Vec<CardInfo> = serde_json::from_value(ctx.execute_js(READ_CARDS_JS).await?)?;
            for (index, card) in cards.into_iter().enumerate() {
                let listing = match card.href {
                    Some(url) => Some(DirectoryListing {
                        name: card.name,
                        url,
                    }),
                    None => match open_card(ctx, index, element_wait, page_settle).await {
                        Ok(listing) => listing,
                        Err(e) => {
                            tracing::warn!("skipping card {index}: {e}");
                            None
                        }
                    },
                };

                if let Some(listing) = listing {
                    if seen.insert(listing.url.clone()) {
                        tracing::debug!("found {} ({})", listing.name, listing.url);
                        officers.push(listing);
                    }
                }
            }

            let advanced = ctx.execute_js(NEXT_PAGE_JS).await?.as_bool().unwrap_or(false);
            if !advanced {
                break;
            }
            tokio::time::sleep(page_settle).await;
            page_number += 1;
        }

        Ok(officers)
    }

    async fn officer_page(&mut self, url: &str) -> SourceResult<String> {
        let (timeout_ms, element_wait) = (self.timeout_ms, self.element_wait);
        let ctx = self.session.context()?;
        let nav = ctx.navigate(url, timeout_ms).await?;
        tracing::debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);
        if !wait_for_selector(ctx, "h1", element_wait).await? {
            return Err(SourceError::Browser(format!("officer page never rendered: {url}")));
        }
        Ok(ctx.get_html().await?)
    }

    async fn close(&mut self) -> SourceResult<()> {
        Ok(self.session.close().await?)
    }
}

/// Cards without a link are opened by clicking; the detail URL and `h1` are
/// read before going back to the listing.
async fn open_card(
    ctx: &mut dyn RenderContext,
    index: usize,
    element_wait: Duration,
    page_settle: Duration,
) -> SourceResult<Option<DirectoryListing>> {
    let click = format!(
        "(() => {{ const c = document.querySelectorAll('mat-card')[{index}]; \
         if (!c) return false; c.scrollIntoView(); c.click(); return true; }})()"
    );
    if !ctx.execute_js(&click).await?.as_bool().unwrap_or(false) {
        return Ok(None);
    }

    let deadline = Instant::now() + element_wait;
    let url = loop {
        let url = ctx.get_url().await?;
        if url.contains("/officer/") {
            break url;
        }
        if Instant::now() >= deadline {
            return Err(SourceError::Browser(format!("card {index} did not open a profile")));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    let name = if wait_for_selector(ctx, "h1", element_wait).await? {
        ctx.execute_js("(document.querySelector('h1').innerText || '').trim()")
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string()
    } else {
        String::new()
    };

    ctx.execute_js("history.back()").await?;
    wait_for_selector(ctx, CARD_SELECTOR, element_wait).await?;
    tokio::time::sleep(page_settle).await;

    Ok(Some(DirectoryListing { name, url }))
}

/// Poll until `selector` matches, up to `timeout`. Returns whether it appeared.
async fn wait_for_selector(
    ctx: &mut dyn RenderContext,
    selector: &str,
    timeout: Duration,
) -> SourceResult<bool> {
    let script = format!("document.querySelector({}) !== null", serde_json::to_string(selector)?);
    let deadline = Instant::now() + timeout;
    loop {
        if ctx.execute_js(&script).await?.as_bool().unwrap_or(false) {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
