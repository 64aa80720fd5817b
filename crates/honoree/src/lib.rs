// Copyright 2026 Honoree Contributors
// SPDX-License-Identifier: MIT

//! Honoree — biographical records for fallen officers and the people memorial
//! highways are named after.
//!
//! Each input name is normalized, then looked up in the ODMP memorial
//! directory (browser-driven, fuzzy-matched), on Wikidata, and summarized
//! from its biography page by a chat model. The results are merged into one
//! fixed-schema row per name.

pub mod acquisition;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod renderer;
pub mod sources;
pub mod stats;

pub use config::LookupConfig;
pub use error::{ConfigError, SourceError, SourceResult};
pub use pipeline::{BatchResult, Pipeline};
