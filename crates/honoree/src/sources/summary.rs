//! Summary adapter: biography page plus a language-model digest.
//!
//! The page named by the request's biography link is fetched, reduced to
//! plain text, and handed to the chat model with a fixed prompt. The model
//! answers with a JSON object which is cleaned up before it becomes fields.

use super::{LookupRequest, SourceAdapter};
use crate::acquisition::html_text::{html_to_text, truncate_chars};
use crate::acquisition::http_client::HttpClient;
use crate::error::{SourceError, SourceResult};
use crate::llm::{extract_json_object, ChatClient};
use async_trait::async_trait;
use honoree_core::dates::{is_empty_marker, normalize_date};
use honoree_core::{Field, PartialFields, Source};
use serde_json::Value;

/// Pages with less text than this are not worth summarizing.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Characters of page text sent to the model.
pub const MAX_CONTENT_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = r#"You extract biographical facts about one person from a web page.

Return ONLY a JSON object with exactly these keys:
- "summary": a biographical summary of exactly 4 sentences covering birth and death, profession, notable achievements and historical significance
- "education": a list of schools, colleges and universities attended (empty list if none)
- "dob": date of birth as YYYY-MM-DD, YYYY-MM or YYYY, or "not found"
- "dod": date of death as YYYY-MM-DD, YYYY-MM or YYYY, or "not found"
- "place_of_birth": city and state or country, or "not found"
- "place_of_death": city and state or country, or "not found"
- "gender": "male", "female" or "not found"
- "involved_in_sports": "yes" or "no"
- "involved_in_politics": "yes" or "no"
- "involved_in_military": "yes" or "no"
- "involved_in_music": "yes" or "no"

Use only facts stated in the content. Do not wrap the JSON in markdown."#;

/// Which biography links may be summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPolicy {
    domains: Vec<String>,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            domains: vec!["wikipedia.org".to_string(), "findagrave.com".to_string()],
        }
    }
}

impl LinkPolicy {
    /// Also accept links on `domain` and its subdomains.
    pub fn allow(mut self, domain: &str) -> Self {
        self.domains.push(domain.to_lowercase());
        self
    }

    /// Whether `link` is an http(s) URL on an accepted domain.
    pub fn permits(&self, link: &str) -> bool {
        let Ok(url) = url::Url::parse(link.trim()) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str().map(str::to_lowercase) else {
            return false;
        };
        self.domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }
}

/// What the model reported, after cleanup. Absent values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiographySummary {
    pub summary: Option<String>,
    pub education: Vec<String>,
    pub dob: Option<String>,
    pub dod: Option<String>,
    pub place_of_birth: Option<String>,
    pub place_of_death: Option<String>,
    pub gender: Option<String>,
    pub involved_in_sports: Option<String>,
    pub involved_in_politics: Option<String>,
    pub involved_in_military: Option<String>,
    pub involved_in_music: Option<String>,
}

impl BiographySummary {
    /// Parse and clean a model answer.
    pub fn from_model_output(content: &str) -> SourceResult<Self> {
        let value: Value = serde_json::from_str(extract_json_object(content))?;
        if !value.is_object() {
            return Err(SourceError::Parse("model answer is not a JSON object".into()));
        }

        Ok(Self {
            summary: text(&value, "summary"),
            education: list(&value, "education"),
            dob: text(&value, "dob").and_then(|d| normalize_date(&d)),
            dod: text(&value, "dod").and_then(|d| normalize_date(&d)),
            place_of_birth: text(&value, "place_of_birth"),
            place_of_death: text(&value, "place_of_death"),
            gender: text(&value, "gender").map(|g| g.to_lowercase()),
            involved_in_sports: yes_no(&value, "involved_in_sports"),
            involved_in_politics: yes_no(&value, "involved_in_politics"),
            involved_in_military: yes_no(&value, "involved_in_military"),
            involved_in_music: yes_no(&value, "involved_in_music"),
        })
    }

    pub fn into_partial(self) -> SourceResult<PartialFields> {
        let education = (!self.education.is_empty()).then(|| self.education.join(", "));

        let mut partial = PartialFields::empty(Source::Summary);
        partial.insert_text(Field::AiSummary, self.summary)?;
        partial.insert_text(Field::AiEducation, education)?;
        partial.insert_text(Field::AiDob, self.dob)?;
        partial.insert_text(Field::AiDod, self.dod)?;
        partial.insert_text(Field::AiPlaceOfBirth, self.place_of_birth)?;
        partial.insert_text(Field::AiPlaceOfDeath, self.place_of_death)?;
        partial.insert_text(Field::AiGender, self.gender)?;
        partial.insert_text(Field::AiInvolvedInSports, self.involved_in_sports)?;
        partial.insert_text(Field::AiInvolvedInPolitics, self.involved_in_politics)?;
        partial.insert_text(Field::AiInvolvedInMilitary, self.involved_in_military)?;
        partial.insert_text(Field::AiInvolvedInMusic, self.involved_in_music)?;
        Ok(partial)
    }
}

fn scalar(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!is_empty_marker(&s)).then_some(s)
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar)
}

fn list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar).collect(),
        Some(other) => scalar(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn yes_no(value: &Value, key: &str) -> Option<String> {
    match text(value, key)?.to_lowercase().as_str() {
        "yes" | "true" => Some("yes".to_string()),
        "no" | "false" => Some("no".to_string()),
        _ => None,
    }
}

/// Summarizes biography pages with a chat model.
pub struct SummaryAdapter {
    http: HttpClient,
    chat: ChatClient,
    links: LinkPolicy,
}

impl SummaryAdapter {
    pub fn new(http: HttpClient, chat: ChatClient) -> Self {
        Self {
            http,
            chat,
            links: LinkPolicy::default(),
        }
    }

    pub fn with_link_policy(mut self, links: LinkPolicy) -> Self {
        self.links = links;
        self
    }

    /// Plain text of a biography page.
    pub async fn page_text(&self, link: &str) -> SourceResult<String> {
        let response = self.http.get(link, &[]).await?.error_for_status()?;
        let text = html_to_text(&response.body);
        let chars = text.trim().chars().count();
        if chars < MIN_CONTENT_CHARS {
            return Err(SourceError::InsufficientContent {
                url: link.to_string(),
                chars,
            });
        }
        Ok(text)
    }
}

fn user_prompt(name: &str, content: &str) -> String {
    format!("Person: {name}\n\nContent:\n{content}\n\nRemember: return ONLY the JSON object.")
}

#[async_trait]
impl SourceAdapter for SummaryAdapter {
    fn source(&self) -> Source {
        Source::Summary
    }

    async fn fetch(&mut self, request: &LookupRequest<'_>) -> SourceResult<PartialFields> {
        let link = request.biography_link.ok_or(SourceError::MissingLink)?;
        if !self.links.permits(link) {
            return Err(SourceError::UnsupportedLink(link.to_string()));
        }

        let text = self.page_text(link).await?;
        let content = truncate_chars(&text, MAX_CONTENT_CHARS);
        tracing::debug!(
            "summarizing {} characters from {link} with {}",
            content.chars().count(),
            self.chat.model()
        );

        let answer = self
            .chat
            .complete_json(SYSTEM_PROMPT, &user_prompt(&request.name.cleaned, content))
            .await?;
        BiographySummary::from_model_output(&answer)?.into_partial()
    }
}
