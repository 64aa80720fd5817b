//! Merge per-source partial field sets into one record.

use crate::fields::PartialFields;
use crate::normalize::NormalizedName;
use crate::record::PersonRecord;

/// Build the record for `name` from whatever the sources produced.
///
/// `None` and empty partials leave their fields unset. Each field has exactly
/// one owning source, so the order of merging does not matter.
pub fn aggregate(
    name: &NormalizedName,
    directory: Option<&PartialFields>,
    knowledge: Option<&PartialFields>,
    summary: Option<&PartialFields>,
) -> PersonRecord {
    let mut record = PersonRecord::new(name);
    for partial in [directory, knowledge, summary].into_iter().flatten() {
        record.merge(partial);
    }
    record
}
