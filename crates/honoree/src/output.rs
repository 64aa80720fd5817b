//! CSV output.

use anyhow::{Context, Result};
use honoree_core::PersonRecord;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `<stem>_output.csv` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "honoree".to_string());
    input.with_file_name(format!("{stem}_output.csv"))
}

/// Write a header row and one row per record.
pub fn write_csv<W: Write>(records: &[PersonRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    writer.write_record(PersonRecord::header())?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(records: &[PersonRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(records, std::io::BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))
}
