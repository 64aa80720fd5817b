//! CLI subcommand implementations for the honoree binary.

pub mod doctor;
pub mod lookup_cmd;
pub mod output;
