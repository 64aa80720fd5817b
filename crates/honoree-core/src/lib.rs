//! Honoree core — name normalization, fuzzy matching, and the fixed-schema
//! person record shared by every data source.

pub mod aggregate;
pub mod dates;
pub mod error;
pub mod fields;
pub mod matcher;
pub mod normalize;
pub mod record;

pub use aggregate::aggregate;
pub use error::{CoreError, CoreResult};
pub use fields::{Field, FieldValue, PartialFields, Source, FIELD_COUNT};
pub use matcher::{FuzzyMatcher, MatchCandidate, DEFAULT_THRESHOLD};
pub use normalize::{normalize, InputKind, InputMode, NormalizedName};
pub use record::PersonRecord;
