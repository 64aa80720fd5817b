//! Error types for source adapters and configuration.

use honoree_core::CoreError;

/// Why a source produced no fields for a name.
///
/// Every variant is recovered by the pipeline as an empty partial for that
/// source; none of them stops a batch.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The best directory candidate scored below the threshold.
    #[error("no directory entry matched '{name}' (best score {best_score:?})")]
    NoMatch { name: String, best_score: Option<f64> },

    /// The jurisdiction has no directory entries.
    #[error("no directory entries for jurisdiction '{0}'")]
    NoData(String),

    /// The knowledge base has no entity for the name.
    #[error("no knowledge-base entity for '{0}'")]
    NotFound(String),

    /// No biography link to summarize.
    #[error("no biography link")]
    MissingLink,

    #[error("unsupported biography link: {0}")]
    UnsupportedLink(String),

    #[error("page at {url} has too little text ({chars} characters)")]
    InsufficientContent { url: String, chars: usize },

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("summarization API error: {0}")]
    Api(String),

    #[error("could not parse response: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SourceError {
    /// Expected misses, as opposed to failures worth a warning.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            SourceError::NoMatch { .. }
                | SourceError::NoData(_)
                | SourceError::NotFound(_)
                | SourceError::MissingLink
        )
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}

impl From<anyhow::Error> for SourceError {
    fn from(e: anyhow::Error) -> Self {
        SourceError::Browser(format!("{e:#}"))
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Settings that make a run impossible. Reported before any name is processed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a jurisdiction (--state) is required when the ODMP directory is enabled")]
    MissingState,

    #[error(
        "an API key is required when the AI summarizer is enabled \
         (pass --api-key or set MISTRAL_API_KEY)"
    )]
    MissingApiKey,

    #[error("match threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(u32),
}
