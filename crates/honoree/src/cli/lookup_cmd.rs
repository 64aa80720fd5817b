//! `honoree lookup`: build records for a name or a file of names.

use anyhow::{bail, Context, Result};
use clap::Args;
use honoree::acquisition::http_client::HttpClient;
use honoree::config::{resolve_api_key, LookupConfig, DEFAULT_MODEL, DEFAULT_TIMEOUT_MS};
use honoree::input::{InputSource, DEFAULT_COLUMN};
use honoree::llm::ChatClient;
use honoree::output::{default_output_path, write_csv, write_csv_file};
use honoree::pipeline::Pipeline;
use honoree::renderer::BrowserSession;
use honoree::sources::{
    BrowserDirectory, KnowledgeBaseAdapter, MemorialDirectoryAdapter, SummaryAdapter,
};
use honoree_core::{FuzzyMatcher, InputMode, DEFAULT_THRESHOLD};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Input file: `.csv` reads a named column, anything else one name per line
    #[arg(conflicts_with = "name", required_unless_present = "name")]
    pub input: Option<PathBuf>,

    /// Look up a single name instead of reading a file
    #[arg(long)]
    pub name: Option<String>,

    /// CSV column holding the names
    #[arg(long, default_value = DEFAULT_COLUMN)]
    pub column: String,

    /// How to read inputs: person, highway or auto
    #[arg(long = "type", default_value = "auto")]
    pub input_type: InputMode,

    /// US state whose ODMP listing is searched (e.g. "texas", "new mexico")
    #[arg(long)]
    pub state: Option<String>,

    /// Minimum fuzzy-match score (0-100) for an ODMP match
    #[arg(long, default_value_t = u32::from(DEFAULT_THRESHOLD))]
    pub threshold: u32,

    /// Skip the ODMP directory
    #[arg(long)]
    pub no_odmp: bool,

    /// Skip Wikidata
    #[arg(long)]
    pub no_wikidata: bool,

    /// Skip the AI summary
    #[arg(long)]
    pub no_ai: bool,

    /// Mistral API key (falls back to $MistralAPIKey)
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat model used for summaries
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Output CSV path (default: <input>_output.csv, or stdout for --name)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl LookupArgs {
    pub fn config(&self) -> LookupConfig {
        let enable_summary = !self.no_ai;
        LookupConfig {
            state: self.state.clone(),
            input_mode: self.input_type,
            threshold: self.threshold,
            enable_directory: !self.no_odmp,
            enable_knowledge: !self.no_wikidata,
            enable_summary,
            api_key: enable_summary
                .then(|| resolve_api_key(self.api_key.as_deref()))
                .flatten(),
            model: self.model.clone(),
            timeout_ms: self.timeout_ms,
        }
    }

    pub fn input_source(&self) -> Result<InputSource> {
        match (&self.name, &self.input) {
            (Some(name), _) => Ok(InputSource::Literal(name.clone())),
            (None, Some(path)) => Ok(InputSource::from_path(path, Some(&self.column))),
            (None, None) => bail!("provide an input file or --name"),
        }
    }
}

/// Run the lookup command.
pub async fn run(args: LookupArgs) -> Result<()> {
    let config = args.config();
    config.validate()?;

    let source = args.input_source()?;
    let names = source.load_names()?;
    if names.is_empty() {
        bail!("no names found in input");
    }
    tracing::info!("loaded {} names", names.len());

    let http = HttpClient::new(config.timeout_ms).context("failed to build HTTP client")?;
    let mut pipeline = Pipeline::new(config.input_mode);

    if config.enable_knowledge {
        pipeline = pipeline.with_adapter(Box::new(KnowledgeBaseAdapter::new(http.clone())));
    }
    if config.enable_summary {
        let api_key = config.api_key.clone().unwrap_or_default();
        let chat = ChatClient::new(http.clone(), api_key, config.model.clone());
        pipeline = pipeline.with_adapter(Box::new(SummaryAdapter::new(http.clone(), chat)));
    }
    if config.enable_directory {
        let state = config.directory_state().unwrap_or_default();
        let matcher = FuzzyMatcher::new(config.threshold_u8())?;
        let session = BrowserSession::launch()
            .await
            .context("failed to start Chromium for the ODMP directory (use --no-odmp to skip)")?;
        let site = BrowserDirectory::new(session, config.timeout_ms);
        pipeline = pipeline.with_adapter(Box::new(MemorialDirectoryAdapter::new(site, state, matcher)));
    }

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // Without a signal handler the batch simply runs to completion.
            std::future::pending::<()>().await;
        }
    };
    let Some(result) = pipeline.run_batch_until(&names, interrupt).await else {
        bail!("interrupted; no output written");
    };

    match (&args.output, source.path()) {
        (Some(path), _) => write_records(&result.records, path)?,
        (None, Some(input)) => write_records(&result.records, &default_output_path(input))?,
        (None, None) => write_csv(&result.records, std::io::stdout().lock())?,
    }

    Ok(())
}

fn write_records(records: &[honoree_core::PersonRecord], path: &std::path::Path) -> Result<()> {
    write_csv_file(records, path)?;
    super::output::status(&format!("Wrote {} records to {}", records.len(), path.display()));
    Ok(())
}
