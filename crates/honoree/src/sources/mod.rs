//! Source adapters. Each one turns a normalized name into the fields its
//! source owns.

pub mod directory;
pub mod knowledge;
pub mod odmp_browser;
pub mod summary;

use crate::error::SourceResult;
use async_trait::async_trait;
use honoree_core::{NormalizedName, PartialFields, Source};

pub use directory::{DirectoryListing, DirectorySite, MemorialDirectoryAdapter, OfficerProfile};
pub use knowledge::KnowledgeBaseAdapter;
pub use odmp_browser::BrowserDirectory;
pub use summary::SummaryAdapter;

/// What an adapter is asked to look up.
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    pub name: &'a NormalizedName,
    /// Page to summarize, normally the knowledge base's biography link.
    pub biography_link: Option<&'a str>,
}

impl<'a> LookupRequest<'a> {
    pub fn new(name: &'a NormalizedName) -> Self {
        Self {
            name,
            biography_link: None,
        }
    }

    pub fn with_link(mut self, link: Option<&'a str>) -> Self {
        self.biography_link = link;
        self
    }
}

/// One external data source.
#[async_trait]
pub trait SourceAdapter: Send {
    /// The source whose fields this adapter fills.
    fn source(&self) -> Source;

    /// Look up one name. The returned partial only holds this source's fields.
    async fn fetch(&mut self, request: &LookupRequest<'_>) -> SourceResult<PartialFields>;

    /// Release anything held for the batch.
    async fn close(&mut self) -> SourceResult<()> {
        Ok(())
    }
}
