//! Knowledge-base adapter (Wikidata).
//!
//! Three calls per name: an entity search, the entity document, and one
//! label lookup for every item id the claims refer to.

use super::{LookupRequest, SourceAdapter};
use crate::acquisition::http_client::HttpClient;
use crate::error::{SourceError, SourceResult};
use async_trait::async_trait;
use honoree_core::dates::clean_knowledge_time;
use honoree_core::{Field, PartialFields, Source};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

pub const WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";
pub const WIKIDATA_ENTITY_URL: &str = "https://www.wikidata.org/wiki/Special:EntityData";

const SEARCH_LIMIT: &str = "5";

const P_OCCUPATION: &str = "P106";
const P_SEX: &str = "P21";
const P_ETHNIC_GROUP: &str = "P172";
const P_BIRTH: &str = "P569";
const P_DEATH: &str = "P570";

/// A claim value: an item reference, a point in time, or plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    Item(String),
    Time(String),
    Text(String),
}

/// The claims and links read from one entity document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFacts {
    pub id: String,
    pub occupations: Vec<ClaimValue>,
    pub sexes: Vec<ClaimValue>,
    pub ethnic_groups: Vec<ClaimValue>,
    pub births: Vec<ClaimValue>,
    pub deaths: Vec<ClaimValue>,
    pub biography_link: Option<String>,
}

impl EntityFacts {
    /// Read an `EntityData` document. The first entity in it is used.
    pub fn from_document(document: &Value) -> SourceResult<Self> {
        let (id, entity) = document
            .get("entities")
            .and_then(Value::as_object)
            .and_then(|m| m.iter().next())
            .ok_or_else(|| SourceError::Parse("entity document has no entities".into()))?;

        Ok(Self {
            id: id.clone(),
            occupations: claim_values(entity, P_OCCUPATION),
            sexes: claim_values(entity, P_SEX),
            ethnic_groups: claim_values(entity, P_ETHNIC_GROUP),
            births: claim_values(entity, P_BIRTH),
            deaths: claim_values(entity, P_DEATH),
            biography_link: sitelink_url(entity),
        })
    }

    /// Item ids that need labels, deduplicated and sorted.
    ///
    /// Only the first value of each property becomes a field, so only those
    /// are resolved.
    pub fn item_ids(&self) -> Vec<String> {
        let ids: BTreeSet<&str> = [&self.occupations, &self.sexes, &self.ethnic_groups]
            .into_iter()
            .filter_map(|values| values.first())
            .filter_map(|v| match v {
                ClaimValue::Item(id) => Some(id.as_str()),
                _ => None,
            })
            .collect();
        ids.into_iter().map(String::from).collect()
    }

    /// Knowledge-base fields, with item ids replaced by their labels.
    pub fn into_partial(self, labels: &HashMap<String, String>) -> SourceResult<PartialFields> {
        let label = |values: &[ClaimValue]| -> Option<String> {
            values.first().map(|v| match v {
                ClaimValue::Item(id) => labels.get(id).cloned().unwrap_or_else(|| id.clone()),
                ClaimValue::Time(t) | ClaimValue::Text(t) => t.clone(),
            })
        };
        let date = |values: &[ClaimValue]| -> Option<String> {
            values.first().and_then(|v| match v {
                ClaimValue::Time(t) | ClaimValue::Text(t) => clean_knowledge_time(t),
                ClaimValue::Item(_) => None,
            })
        };

        let mut partial = PartialFields::empty(Source::KnowledgeBase);
        partial.insert_text(Field::WikidataOccupation, label(&self.occupations))?;
        partial.insert_text(Field::WikidataRace, label(&self.ethnic_groups))?;
        partial.insert_text(Field::WikidataSex, label(&self.sexes))?;
        partial.insert_text(Field::WikidataBirthDate, date(&self.births))?;
        partial.insert_text(Field::WikidataDeathDate, date(&self.deaths))?;
        partial.insert_text(Field::WikipediaLink, self.biography_link)?;
        Ok(partial)
    }
}

fn claim_values(entity: &Value, property: &str) -> Vec<ClaimValue> {
    let Some(claims) = entity
        .get("claims")
        .and_then(|c| c.get(property))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    claims
        .iter()
        .filter_map(|claim| claim.pointer("/mainsnak/datavalue/value"))
        .filter_map(|value| {
            if let Some(id) = value.get("id").and_then(Value::as_str) {
                Some(ClaimValue::Item(id.to_string()))
            } else if let Some(time) = value.get("time").and_then(Value::as_str) {
                Some(ClaimValue::Time(time.trim_start_matches('+').to_string()))
            } else {
                value.as_str().map(|s| ClaimValue::Text(s.to_string()))
            }
        })
        .collect()
}

/// English Wikipedia article if there is one, otherwise the first sitelink.
fn sitelink_url(entity: &Value) -> Option<String> {
    let sitelinks = entity.get("sitelinks")?.as_object()?;
    if let Some(enwiki) = sitelinks.get("enwiki") {
        if let Some(url) = enwiki.get("url").and_then(Value::as_str) {
            return Some(url.to_string());
        }
        if let Some(title) = enwiki.get("title").and_then(Value::as_str) {
            return Some(format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")));
        }
    }
    sitelinks
        .values()
        .find_map(|s| s.get("url").and_then(Value::as_str))
        .map(String::from)
}

/// Looks names up on Wikidata.
pub struct KnowledgeBaseAdapter {
    http: HttpClient,
    api_url: String,
    entity_url: String,
}

impl KnowledgeBaseAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self::with_endpoints(http, WIKIDATA_API_URL, WIKIDATA_ENTITY_URL)
    }

    /// Use other endpoints, e.g. a mirror or a mock server.
    pub fn with_endpoints(http: HttpClient, api_url: &str, entity_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
            entity_url: entity_url.trim_end_matches('/').to_string(),
        }
    }

    /// Id of the first search hit for `name`.
    pub async fn search(&self, name: &str) -> SourceResult<Option<String>> {
        let body = self
            .http
            .get_json(
                &self.api_url,
                &[
                    ("action", "wbsearchentities"),
                    ("format", "json"),
                    ("search", name),
                    ("language", "en"),
                    ("limit", SEARCH_LIMIT),
                ],
            )
            .await?;

        Ok(body
            .get("search")
            .and_then(Value::as_array)
            .and_then(|hits| hits.first())
            .and_then(|hit| hit.get("id"))
            .and_then(Value::as_str)
            .map(String::from))
    }

    pub async fn entity(&self, id: &str) -> SourceResult<EntityFacts> {
        let url = format!("{}/{}.json", self.entity_url, id);
        let document = self.http.get_json(&url, &[]).await?;
        EntityFacts::from_document(&document)
    }

    /// English labels for item ids. Ids without a label are left out.
    pub async fn labels(&self, ids: &[String]) -> SourceResult<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = ids.join("|");
        let body = self
            .http
            .get_json(
                &self.api_url,
                &[
                    ("action", "wbgetentities"),
                    ("format", "json"),
                    ("ids", &joined),
                    ("props", "labels"),
                    ("languages", "en"),
                ],
            )
            .await?;

        let labels: HashMap<String, String> = body
            .get("entities")
            .and_then(Value::as_object)
            .map(|entities| {
                entities
                    .iter()
                    .filter_map(|(id, entity)| {
                        let label = entity.pointer("/labels/en/value")?.as_str()?;
                        Some((id.clone(), label.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(labels)
    }
}

#[async_trait]
impl SourceAdapter for KnowledgeBaseAdapter {
    fn source(&self) -> Source {
        Source::KnowledgeBase
    }

    async fn fetch(&mut self, request: &LookupRequest<'_>) -> SourceResult<PartialFields> {
        let name = request.name.cleaned.as_str();
        let id = self
            .search(name)
            .await?
            .ok_or_else(|| SourceError::NotFound(name.to_string()))?;
        tracing::debug!("Wikidata entity for '{name}': {id}");

        let facts = self.entity(&id).await?;
        let labels = self.labels(&facts.item_ids()).await?;
        facts.into_partial(&labels)
    }
}
