//! Per-source timing and outcome counters for a batch.

use honoree_core::Source;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// How one adapter call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fields were produced.
    Hit,
    /// The source had nothing for the name.
    Miss,
    /// The call failed.
    Failure,
}

/// Counters for one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceStats {
    pub calls: u32,
    pub hits: u32,
    pub misses: u32,
    pub failures: u32,
    pub total_ms: u64,
}

impl SourceStats {
    pub fn average_ms(&self) -> u64 {
        if self.calls == 0 {
            0
        } else {
            self.total_ms / u64::from(self.calls)
        }
    }
}

/// Timings collected over one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimingStats {
    pub names: u32,
    pub total_ms: u64,
    pub sources: BTreeMap<Source, SourceStats>,
}

impl TimingStats {
    pub fn record(&mut self, source: Source, outcome: Outcome, elapsed: Duration) {
        let entry = self.sources.entry(source).or_default();
        entry.calls += 1;
        entry.total_ms += elapsed.as_millis() as u64;
        match outcome {
            Outcome::Hit => entry.hits += 1,
            Outcome::Miss => entry.misses += 1,
            Outcome::Failure => entry.failures += 1,
        }
    }

    pub fn get(&self, source: Source) -> Option<&SourceStats> {
        self.sources.get(&source)
    }

    /// Human-readable summary, one line per entry.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} names in {:.1}s",
            self.names,
            self.total_ms as f64 / 1000.0
        )];
        for (source, s) in &self.sources {
            lines.push(format!(
                "  {source}: {} calls, {} hits, {} misses, {} failures, {:.2}s total, {}ms avg",
                s.calls,
                s.hits,
                s.misses,
                s.failures,
                s.total_ms as f64 / 1000.0,
                s.average_ms()
            ));
        }
        lines
    }

    pub fn log_summary(&self) {
        for line in self.summary_lines() {
            tracing::info!("{line}");
        }
    }
}
