//! The aggregated output row for one input name.

use crate::fields::{Field, FieldValue, PartialFields, FIELD_COUNT};
use crate::normalize::NormalizedName;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One row of the output table.
///
/// Holds a slot for every [`Field`]; unset slots serialize as empty cells
/// (CSV) or `null` (JSON), so the column set never depends on which sources
/// ran.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    values: [Option<FieldValue>; FIELD_COUNT],
}

impl PersonRecord {
    /// A record with only the input fields set.
    pub fn new(name: &NormalizedName) -> Self {
        let mut record = Self {
            values: std::array::from_fn(|_| None),
        };
        record.set(Field::InputName, name.raw.as_str());
        record.set(Field::CleanedName, name.cleaned.as_str());
        record.set(Field::InputType, name.kind.as_str());
        record
    }

    fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.values[field.index()] = Some(value.into());
    }

    /// Copy every value of `partial` into the record.
    pub fn merge(&mut self, partial: &PartialFields) {
        for (field, value) in partial.iter() {
            self.values[field.index()] = Some(value.clone());
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values[field.index()].as_ref()
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    /// Whether any field owned by `source` is set.
    pub fn has_any(&self, source: crate::fields::Source) -> bool {
        source.fields().any(|f| self.get(f).is_some())
    }

    /// Column names, in order.
    pub fn header() -> Vec<&'static str> {
        Field::ALL.iter().map(|f| f.name()).collect()
    }

    /// Cell values, in column order; unset fields are empty strings.
    pub fn to_row(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| v.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect()
    }
}

impl Serialize for PersonRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for field in Field::ALL {
            map.serialize_entry(field.name(), &self.values[field.index()])?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Source;
    use crate::normalize::{normalize, InputMode};

    #[test]
    fn test_new_record_sets_input_fields_only() {
        let record = PersonRecord::new(&normalize("Jane Doe Memorial Highway", InputMode::Auto));
        assert_eq!(record.text(Field::InputName), Some("Jane Doe Memorial Highway"));
        assert_eq!(record.text(Field::CleanedName), Some("Jane Doe"));
        assert_eq!(record.text(Field::InputType), Some("highway"));
        assert!(!record.has_any(Source::Directory));
        assert!(!record.has_any(Source::KnowledgeBase));
        assert!(!record.has_any(Source::Summary));
    }

    #[test]
    fn test_row_matches_header_width() {
        let record = PersonRecord::new(&normalize("Jane Doe", InputMode::Person));
        let row = record.to_row();
        assert_eq!(row.len(), PersonRecord::header().len());
        assert_eq!(row[0], "Jane Doe");
        assert!(row[3..].iter().all(String::is_empty));
    }

    #[test]
    fn test_json_has_every_field() {
        let record = PersonRecord::new(&normalize("Jane Doe", InputMode::Person));
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), FIELD_COUNT);
        assert!(obj["ai_summary"].is_null());
        assert_eq!(obj["input_type"], "person");
    }

    #[test]
    fn test_merge_numeric_score() {
        let mut record = PersonRecord::new(&normalize("Jane Doe", InputMode::Person));
        let mut partial = PartialFields::empty(Source::Directory);
        partial.insert(Field::OdmpFuzzyScore, 96.5).unwrap();
        record.merge(&partial);
        assert_eq!(record.get(Field::OdmpFuzzyScore).and_then(FieldValue::as_number), Some(96.5));
        assert_eq!(record.to_row()[Field::OdmpFuzzyScore.index()], "96.5");
    }
}
