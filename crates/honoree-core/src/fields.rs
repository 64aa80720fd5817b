//! The fixed output schema and per-source field ownership.
//!
//! Every column of the output table is a [`Field`]. Each field is owned by
//! exactly one [`Source`], and adapters hand their results over as
//! [`PartialFields`], which refuses fields owned by a different source. That
//! keeps the merge in [`crate::aggregate`] free of conflict resolution.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of columns in the output schema.
pub const FIELD_COUNT: usize = 30;

/// Where a field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The raw input and the normalizer.
    Input,
    /// The fallen-officer memorial directory.
    Directory,
    /// The structured knowledge base.
    KnowledgeBase,
    /// The language-model summary of the biography page.
    Summary,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Input => "input",
            Source::Directory => "directory",
            Source::KnowledgeBase => "knowledge_base",
            Source::Summary => "summary",
        }
    }

    /// Fields owned by this source, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.iter().copied().filter(move |f| f.source() == *self)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of the output table.
///
/// Variant order is column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    InputName,
    CleanedName,
    InputType,

    OdmpUrl,
    OdmpName,
    OdmpBio,
    OdmpAge,
    OdmpTour,
    OdmpBadge,
    OdmpCause,
    OdmpEndOfWatch,
    OdmpIncidentDetails,
    OdmpFuzzyScore,

    WikidataOccupation,
    WikidataRace,
    WikidataSex,
    WikidataBirthDate,
    WikidataDeathDate,
    WikipediaLink,

    AiSummary,
    AiEducation,
    AiDob,
    AiDod,
    AiPlaceOfBirth,
    AiPlaceOfDeath,
    AiGender,
    AiInvolvedInSports,
    AiInvolvedInPolitics,
    AiInvolvedInMilitary,
    AiInvolvedInMusic,
}

impl Field {
    /// Every field, in column order.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::InputName,
        Field::CleanedName,
        Field::InputType,
        Field::OdmpUrl,
        Field::OdmpName,
        Field::OdmpBio,
        Field::OdmpAge,
        Field::OdmpTour,
        Field::OdmpBadge,
        Field::OdmpCause,
        Field::OdmpEndOfWatch,
        Field::OdmpIncidentDetails,
        Field::OdmpFuzzyScore,
        Field::WikidataOccupation,
        Field::WikidataRace,
        Field::WikidataSex,
        Field::WikidataBirthDate,
        Field::WikidataDeathDate,
        Field::WikipediaLink,
        Field::AiSummary,
        Field::AiEducation,
        Field::AiDob,
        Field::AiDod,
        Field::AiPlaceOfBirth,
        Field::AiPlaceOfDeath,
        Field::AiGender,
        Field::AiInvolvedInSports,
        Field::AiInvolvedInPolitics,
        Field::AiInvolvedInMilitary,
        Field::AiInvolvedInMusic,
    ];

    /// Column name used in the serialized table.
    pub fn name(&self) -> &'static str {
        match self {
            Field::InputName => "input_name",
            Field::CleanedName => "cleaned_name",
            Field::InputType => "input_type",
            Field::OdmpUrl => "odmp_url",
            Field::OdmpName => "odmp_name",
            Field::OdmpBio => "odmp_bio",
            Field::OdmpAge => "odmp_age",
            Field::OdmpTour => "odmp_tour",
            Field::OdmpBadge => "odmp_badge",
            Field::OdmpCause => "odmp_cause",
            Field::OdmpEndOfWatch => "odmp_end_of_watch",
            Field::OdmpIncidentDetails => "odmp_incident_details",
            Field::OdmpFuzzyScore => "odmp_fuzzy_score",
            Field::WikidataOccupation => "wikidata_occupation",
            Field::WikidataRace => "wikidata_race",
            Field::WikidataSex => "wikidata_sex",
            Field::WikidataBirthDate => "wikidata_birth_date",
            Field::WikidataDeathDate => "wikidata_death_date",
            Field::WikipediaLink => "wikipedia_link",
            Field::AiSummary => "ai_summary",
            Field::AiEducation => "ai_education",
            Field::AiDob => "ai_dob",
            Field::AiDod => "ai_dod",
            Field::AiPlaceOfBirth => "ai_place_of_birth",
            Field::AiPlaceOfDeath => "ai_place_of_death",
            Field::AiGender => "ai_gender",
            Field::AiInvolvedInSports => "ai_involved_in_sports",
            Field::AiInvolvedInPolitics => "ai_involved_in_politics",
            Field::AiInvolvedInMilitary => "ai_involved_in_military",
            Field::AiInvolvedInMusic => "ai_involved_in_music",
        }
    }

    /// The source that owns this field.
    pub fn source(&self) -> Source {
        match self {
            Field::InputName | Field::CleanedName | Field::InputType => Source::Input,
            Field::OdmpUrl
            | Field::OdmpName
            | Field::OdmpBio
            | Field::OdmpAge
            | Field::OdmpTour
            | Field::OdmpBadge
            | Field::OdmpCause
            | Field::OdmpEndOfWatch
            | Field::OdmpIncidentDetails
            | Field::OdmpFuzzyScore => Source::Directory,
            Field::WikidataOccupation
            | Field::WikidataRace
            | Field::WikidataSex
            | Field::WikidataBirthDate
            | Field::WikidataDeathDate
            | Field::WikipediaLink => Source::KnowledgeBase,
            _ => Source::Summary,
        }
    }

    /// Position of this field in the output row.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// The fields one source produced for one name.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialFields {
    source: Source,
    values: BTreeMap<Field, FieldValue>,
}

impl PartialFields {
    /// An empty set for `source`; also what a disabled or failed adapter yields.
    pub fn empty(source: Source) -> Self {
        Self {
            source,
            values: BTreeMap::new(),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Set a field. Fails if the field belongs to a different source.
    pub fn insert(&mut self, field: Field, value: impl Into<FieldValue>) -> CoreResult<()> {
        if field.source() != self.source {
            return Err(CoreError::foreign(field, self.source));
        }
        self.values.insert(field, value.into());
        Ok(())
    }

    /// Set a text field when `value` holds non-blank text; otherwise leave it unset.
    pub fn insert_text(&mut self, field: Field, value: Option<impl AsRef<str>>) -> CoreResult<()> {
        match value.as_ref().map(|v| v.as_ref().trim()) {
            Some(v) if !v.is_empty() => self.insert(field, v),
            _ => {
                if field.source() != self.source {
                    return Err(CoreError::foreign(field, self.source));
                }
                Ok(())
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_thirty_unique_fields_in_order() {
        assert_eq!(Field::ALL.len(), FIELD_COUNT);
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), i, "{field} out of order");
        }
        let mut names: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FIELD_COUNT);
    }

    #[test]
    fn test_field_prefixes_match_owner() {
        for field in Field::ALL {
            let name = field.name();
            let expected = if name.starts_with("odmp_") {
                Source::Directory
            } else if name.starts_with("wiki") {
                Source::KnowledgeBase
            } else if name.starts_with("ai_") {
                Source::Summary
            } else {
                Source::Input
            };
            assert_eq!(field.source(), expected, "{name}");
        }
    }

    #[test]
    fn test_source_field_counts() {
        assert_eq!(Source::Input.fields().count(), 3);
        assert_eq!(Source::Directory.fields().count(), 10);
        assert_eq!(Source::KnowledgeBase.fields().count(), 6);
        assert_eq!(Source::Summary.fields().count(), 11);
    }

    #[test]
    fn test_partial_rejects_foreign_field() {
        let mut partial = PartialFields::empty(Source::KnowledgeBase);
        let err = partial.insert(Field::OdmpName, "Jane Doe").unwrap_err();
        assert!(matches!(err, CoreError::ForeignField { owner: Source::Directory, .. }));
        assert!(partial.is_empty());
    }

    #[test]
    fn test_insert_text_skips_blank() {
        let mut partial = PartialFields::empty(Source::Summary);
        partial.insert_text(Field::AiGender, Some("   ")).unwrap();
        partial.insert_text(Field::AiDob, None::<&str>).unwrap();
        partial.insert_text(Field::AiSummary, Some(" A life. ")).unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial.get(Field::AiSummary).and_then(|v| v.as_text()), Some("A life."));
    }

    #[test]
    fn test_number_display() {
        assert_eq!(FieldValue::Number(100.0).to_string(), "100");
        assert_eq!(FieldValue::Number(93.33).to_string(), "93.33");
    }
}
