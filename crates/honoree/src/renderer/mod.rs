//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide), and the
//! `BrowserSession` that a batch holds for its whole duration.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&mut self) -> Result<()>;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A browser plus the one tab a batch drives.
///
/// Acquired once per batch and handed to the directory adapter. It is not
/// meant to be shared: all access goes through `&mut self`.
pub struct BrowserSession {
    renderer: Box<dyn Renderer>,
    context: Option<Box<dyn RenderContext>>,
}

impl BrowserSession {
    /// Launch headless Chromium and open a tab.
    pub async fn launch() -> Result<Self> {
        let renderer = chromium::ChromiumRenderer::new().await?;
        Self::open(Box::new(renderer)).await
    }

    /// Open a tab on an existing renderer.
    pub async fn open(renderer: Box<dyn Renderer>) -> Result<Self> {
        let context = renderer.new_context().await?;
        Ok(Self {
            renderer,
            context: Some(context),
        })
    }

    /// The tab. Fails once the session is closed.
    pub fn context(&mut self) -> Result<&mut dyn RenderContext> {
        match self.context.as_mut() {
            Some(ctx) => Ok(ctx.as_mut()),
            None => anyhow::bail!("browser session already closed"),
        }
    }

    /// Close the tab and shut the browser down. Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(ctx) = self.context.take() {
            if let Err(e) = ctx.close().await {
                tracing::warn!("failed to close browser tab: {e:#}");
            }
            self.renderer.shutdown().await?;
            tracing::info!("browser session released");
        }
        Ok(())
    }
}
