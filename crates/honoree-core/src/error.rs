//! Error types for the core library.

use crate::fields::{Field, Source};

/// All errors that can occur in the core library.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A partial field set tried to carry a field owned by another source.
    #[error("field '{field}' belongs to {owner}, not {source_kind}")]
    ForeignField {
        field: &'static str,
        owner: Source,
        source_kind: Source,
    },

    #[error("match threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(u32),

    #[error("unknown input type '{0}' (expected person, highway or auto)")]
    UnknownInputMode(String),
}

impl CoreError {
    pub(crate) fn foreign(field: Field, source_kind: Source) -> Self {
        CoreError::ForeignField {
            field: field.name(),
            owner: field.source(),
            source_kind,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
