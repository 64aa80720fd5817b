//! The batch runner: every name through every enabled source, in order.

use crate::sources::{LookupRequest, SourceAdapter};
use crate::stats::{Outcome, TimingStats};
use honoree_core::{aggregate, normalize, Field, InputMode, PartialFields, PersonRecord, Source};
use serde::Serialize;
use std::future::Future;
use std::time::Instant;

/// Records for a batch, in input order, plus how long each source took.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub records: Vec<PersonRecord>,
    pub stats: TimingStats,
}

/// Runs names through the directory, knowledge-base and summary adapters.
///
/// Names are processed one at a time. A failing adapter only empties its own
/// fields for that name.
pub struct Pipeline {
    mode: InputMode,
    directory: Option<Box<dyn SourceAdapter>>,
    knowledge: Option<Box<dyn SourceAdapter>>,
    summary: Option<Box<dyn SourceAdapter>>,
    stats: TimingStats,
}

impl Pipeline {
    /// A pipeline with no sources; records carry only the input fields.
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            directory: None,
            knowledge: None,
            summary: None,
            stats: TimingStats::default(),
        }
    }

    /// Install an adapter in the slot for the source it reports.
    pub fn with_adapter(mut self, adapter: Box<dyn SourceAdapter>) -> Self {
        match adapter.source() {
            Source::Directory => self.directory = Some(adapter),
            Source::KnowledgeBase => self.knowledge = Some(adapter),
            Source::Summary => self.summary = Some(adapter),
            Source::Input => tracing::warn!("ignoring adapter for the input source"),
        }
        self
    }

    pub fn stats(&self) -> &TimingStats {
        &self.stats
    }

    /// Look up one raw name.
    ///
    /// Does not release adapters; call [`close`](Self::close) when done.
    pub async fn lookup(&mut self, raw: &str) -> PersonRecord {
        let name = normalize(raw, self.mode);
        if name.cleaned != raw.trim() {
            tracing::info!("cleaned '{}' -> '{}' ({})", raw.trim(), name.cleaned, name.kind.as_str());
        }

        let request = LookupRequest::new(&name);
        let directory = run_stage(&mut self.directory, &request, &mut self.stats).await;
        let knowledge = run_stage(&mut self.knowledge, &request, &mut self.stats).await;

        let link = knowledge
            .as_ref()
            .and_then(|k| k.get(Field::WikipediaLink))
            .and_then(|v| v.as_text());
        let summary = match link {
            Some(link) => {
                let request = request.with_link(Some(link));
                run_stage(&mut self.summary, &request, &mut self.stats).await
            }
            None => {
                if self.summary.is_some() {
                    tracing::info!("  summary: skipped, no biography link");
                }
                None
            }
        };

        self.stats.names += 1;
        aggregate(&name, directory.as_ref(), knowledge.as_ref(), summary.as_ref())
    }

    /// Process every name, then release the adapters.
    pub async fn run_batch<S: AsRef<str>>(&mut self, names: &[S]) -> BatchResult {
        let start = Instant::now();
        let total = names.len();
        let mut records = Vec::with_capacity(total);

        for (i, raw) in names.iter().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, total, raw.as_ref());
            records.push(self.lookup(raw.as_ref()).await);
        }

        self.close().await;
        self.stats.total_ms = start.elapsed().as_millis() as u64;
        self.stats.log_summary();

        BatchResult {
            records,
            stats: self.stats.clone(),
        }
    }

    /// Like [`run_batch`](Self::run_batch), but gives up when `interrupt`
    /// completes. The adapters are released either way; `None` means the
    /// batch was interrupted.
    pub async fn run_batch_until<S, F>(&mut self, names: &[S], interrupt: F) -> Option<BatchResult>
    where
        S: AsRef<str>,
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run_batch(names) => Some(result),
            _ = interrupt => {
                tracing::warn!("interrupted, releasing sources");
                self.close().await;
                None
            }
        }
    }

    /// Release every adapter. Failures are logged, not returned.
    pub async fn close(&mut self) {
        for adapter in [&mut self.directory, &mut self.knowledge, &mut self.summary]
            .into_iter()
            .flatten()
        {
            if let Err(e) = adapter.close().await {
                tracing::warn!("failed to close {} adapter: {e}", adapter.source());
            }
        }
    }
}

async fn run_stage(
    adapter: &mut Option<Box<dyn SourceAdapter>>,
    request: &LookupRequest<'_>,
    stats: &mut TimingStats,
) -> Option<PartialFields> {
    let adapter = adapter.as_mut()?;
    let source = adapter.source();
    let start = Instant::now();
    let result = adapter.fetch(request).await;
    let elapsed = start.elapsed();

    match result {
        Ok(partial) => {
            let outcome = if partial.is_empty() { Outcome::Miss } else { Outcome::Hit };
            stats.record(source, outcome, elapsed);
            tracing::info!("  {source}: {} fields ({}ms)", partial.len(), elapsed.as_millis());
            Some(partial)
        }
        Err(e) if e.is_miss() => {
            stats.record(source, Outcome::Miss, elapsed);
            tracing::info!("  {source}: {e}");
            Some(PartialFields::empty(source))
        }
        Err(e) => {
            stats.record(source, Outcome::Failure, elapsed);
            tracing::warn!("  {source} failed for '{}': {e}", request.name.cleaned);
            Some(PartialFields::empty(source))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SourceError, SourceResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FixedKnowledge;

    #[async_trait]
    impl SourceAdapter for FixedKnowledge {
        fn source(&self) -> Source {
            Source::KnowledgeBase
        }

        async fn fetch(&mut self, request: &LookupRequest<'_>) -> SourceResult<PartialFields> {
            if request.name.cleaned.starts_with("Unknown") {
                return Err(SourceError::NotFound(request.name.cleaned.clone()));
            }
            let mut p = PartialFields::empty(Source::KnowledgeBase);
            p.insert(Field::WikidataOccupation, "police officer")?;
            p.insert(Field::WikipediaLink, "https://en.wikipedia.org/wiki/X")?;
            Ok(p)
        }
    }

    struct LinkEcho {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SourceAdapter for LinkEcho {
        fn source(&self) -> Source {
            Source::Summary
        }

        async fn fetch(&mut self, request: &LookupRequest<'_>) -> SourceResult<PartialFields> {
            let link = request.biography_link.ok_or(SourceError::MissingLink)?;
            let mut p = PartialFields::empty(Source::Summary);
            p.insert(Field::AiSummary, format!("from {link}"))?;
            Ok(p)
        }

        async fn close(&mut self) -> SourceResult<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_summary_gets_link_from_knowledge() {
        let closed = Arc::new(AtomicBool::new(false));
        let mut pipeline = Pipeline::new(InputMode::Person)
            .with_adapter(Box::new(FixedKnowledge))
            .with_adapter(Box::new(LinkEcho { closed: Arc::clone(&closed) }));

        let result = pipeline.run_batch(&["Jane Doe", "Unknown Person"]).await;
        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0].text(Field::AiSummary),
            Some("from https://en.wikipedia.org/wiki/X")
        );
        assert_eq!(result.records[1].text(Field::InputName), Some("Unknown Person"));
        assert!(!result.records[1].has_any(Source::KnowledgeBase));
        assert!(!result.records[1].has_any(Source::Summary));
        assert!(closed.load(Ordering::SeqCst));

        let kb = result.stats.get(Source::KnowledgeBase).unwrap();
        assert_eq!((kb.hits, kb.misses), (1, 1));
        assert_eq!(result.stats.names, 2);

        // No link for the second name, so the summary adapter ran once.
        let summary = result.stats.get(Source::Summary).unwrap();
        assert_eq!((summary.calls, summary.hits, summary.misses), (1, 1, 0));
    }

    struct StuckDirectory {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SourceAdapter for StuckDirectory {
        fn source(&self) -> Source {
            Source::Directory
        }

        async fn fetch(&mut self, _request: &LookupRequest<'_>) -> SourceResult<PartialFields> {
            std::future::pending().await
        }

        async fn close(&mut self) -> SourceResult<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_interrupt_still_closes_adapters() {
        let closed = Arc::new(AtomicBool::new(false));
        let mut pipeline = Pipeline::new(InputMode::Person).with_adapter(Box::new(StuckDirectory {
            closed: Arc::clone(&closed),
        }));

        let interrupt = tokio::time::sleep(std::time::Duration::from_millis(20));
        let result = pipeline.run_batch_until(&["Jane Doe", "John Roe"], interrupt).await;

        assert!(result.is_none());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_uninterrupted_batch_completes() {
        let mut pipeline = Pipeline::new(InputMode::Person);
        let result = pipeline
            .run_batch_until(&["Jane Doe"], std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(result.records.len(), 1);
    }

    #[tokio::test]
    async fn test_no_adapters_yields_input_fields_only() {
        let mut pipeline = Pipeline::new(InputMode::Auto);
        let record = pipeline.lookup("Trooper Jane Doe Memorial Highway").await;
        assert_eq!(record.text(Field::CleanedName), Some("Jane Doe"));
        assert_eq!(record.text(Field::InputType), Some("highway"));
        assert!(!record.has_any(Source::Directory));
        assert_eq!(record.to_row().len(), 30);
    }
}
