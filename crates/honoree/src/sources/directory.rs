//! Memorial-directory adapter (ODMP).
//!
//! The directory is browsed per jurisdiction: every officer listed for the
//! state is enumerated once per batch, names are fuzzy-matched in memory, and
//! only the matched officer's detail page is fetched and parsed. How pages are
//! obtained is behind [`DirectorySite`]; production uses a headless browser
//! (see [`super::odmp_browser`]).

use super::{LookupRequest, SourceAdapter};
use crate::error::{SourceError, SourceResult};
use async_trait::async_trait;
use honoree_core::{Field, FuzzyMatcher, PartialFields, Source};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One officer as listed on the directory's browse pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub name: String,
    /// Absolute URL of the officer's detail page.
    pub url: String,
}

/// Access to the directory's pages.
#[async_trait]
pub trait DirectorySite: Send {
    /// Every officer listed for a jurisdiction slug such as `new-mexico`.
    async fn list_officers(&mut self, state: &str) -> SourceResult<Vec<DirectoryListing>>;

    /// Rendered HTML of an officer's detail page.
    async fn officer_page(&mut self, url: &str) -> SourceResult<String>;

    /// Release the underlying session.
    async fn close(&mut self) -> SourceResult<()> {
        Ok(())
    }
}

/// Biographical fields read from an officer's detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerProfile {
    pub url: String,
    pub name: Option<String>,
    pub age: Option<String>,
    pub tour: Option<String>,
    pub badge: Option<String>,
    pub cause: Option<String>,
    pub end_of_watch: Option<String>,
    pub bio: Option<String>,
    pub incident_details: Option<String>,
}

impl OfficerProfile {
    /// Directory fields for the record, including the match score.
    pub fn into_partial(self, score: f64) -> SourceResult<PartialFields> {
        let mut partial = PartialFields::empty(Source::Directory);
        partial.insert_text(Field::OdmpUrl, Some(&self.url))?;
        partial.insert_text(Field::OdmpName, self.name)?;
        partial.insert_text(Field::OdmpBio, self.bio)?;
        partial.insert_text(Field::OdmpAge, self.age)?;
        partial.insert_text(Field::OdmpTour, self.tour)?;
        partial.insert_text(Field::OdmpBadge, self.badge)?;
        partial.insert_text(Field::OdmpCause, self.cause)?;
        partial.insert_text(Field::OdmpEndOfWatch, self.end_of_watch)?;
        partial.insert_text(Field::OdmpIncidentDetails, self.incident_details)?;
        partial.insert(Field::OdmpFuzzyScore, score)?;
        Ok(partial)
    }
}

/// Matches names against a jurisdiction's officer listing.
pub struct MemorialDirectoryAdapter<S: DirectorySite> {
    site: S,
    state: String,
    matcher: FuzzyMatcher,
    listing: Option<Vec<DirectoryListing>>,
}

impl<S: DirectorySite> MemorialDirectoryAdapter<S> {
    pub fn new(site: S, state: impl Into<String>, matcher: FuzzyMatcher) -> Self {
        Self {
            site,
            state: state.into(),
            matcher,
            listing: None,
        }
    }

    async fn ensure_listing(&mut self) -> SourceResult<&[DirectoryListing]> {
        if self.listing.is_none() {
            let start = Instant::now();
            let officers = self.site.list_officers(&self.state).await?;
            tracing::info!(
                "ODMP listing for '{}': {} officers in {:.2}s",
                self.state,
                officers.len(),
                start.elapsed().as_secs_f64()
            );
            self.listing = Some(officers);
        }
        Ok(self.listing.as_deref().unwrap_or_default())
    }
}

#[async_trait]
impl<S: DirectorySite> SourceAdapter for MemorialDirectoryAdapter<S> {
    fn source(&self) -> Source {
        Source::Directory
    }

    async fn fetch(&mut self, request: &LookupRequest<'_>) -> SourceResult<PartialFields> {
        let target = request.name.cleaned.as_str();
        let matcher = self.matcher;
        let state = self.state.clone();

        let listing = self.ensure_listing().await?;
        if listing.is_empty() {
            return Err(SourceError::NoData(state));
        }

        let names: Vec<&str> = listing.iter().map(|o| o.name.as_str()).collect();
        let Some(found) = matcher.best_match(target, &names) else {
            let best_score = names
                .iter()
                .filter(|n| !n.trim().is_empty())
                .map(|n| matcher.score(target, n))
                .reduce(f64::max);
            return Err(SourceError::NoMatch {
                name: target.to_string(),
                best_score,
            });
        };

        let officer = listing[found.index].clone();
        tracing::info!("ODMP match ({}): {}", found.score, officer.name);

        let html = self.site.officer_page(&officer.url).await?;
        let mut profile = parse_officer_page(&html, &officer.url);
        if profile.name.is_none() {
            profile.name = Some(officer.name);
        }
        profile.into_partial(found.score)
    }

    async fn close(&mut self) -> SourceResult<()> {
        self.listing = None;
        self.site.close().await
    }
}

// ── Detail page parsing ─────────────────────────────────────────────────────

/// Minimum length of the paragraph taken as the memorial narrative.
const BIO_MIN_CHARS: usize = 200;

/// Read an officer detail page.
pub fn parse_officer_page(html: &str, url: &str) -> OfficerProfile {
    let document = Html::parse_document(html);

    let h1 = Selector::parse("h1").expect("valid selector");
    let name = document
        .select(&h1)
        .next()
        .map(|el| collapsed_text(&el))
        .filter(|s| !s.is_empty());

    OfficerProfile {
        url: url.to_string(),
        name,
        age: value_after_label(&document, "Age:"),
        tour: value_after_label(&document, "Tour:"),
        badge: value_after_label(&document, "Badge:"),
        cause: value_after_label(&document, "Cause:"),
        end_of_watch: end_of_watch(&document),
        bio: first_long_paragraph(&document),
        incident_details: incident_details(&document),
    }
}

/// Text of all descendant text nodes, trimmed and joined with single spaces.
fn collapsed_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The text node right after a `<strong>` label such as `Age:`.
fn value_after_label(document: &Html, label: &str) -> Option<String> {
    let strong = Selector::parse("strong").expect("valid selector");
    let label = label.to_lowercase();

    document
        .select(&strong)
        .filter(|el| collapsed_text(el).to_lowercase().contains(&label))
        .find_map(following_text)
}

fn following_text(el: ElementRef<'_>) -> Option<String> {
    let text = el.next_sibling()?.value().as_text()?.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn end_of_watch(document: &Html) -> Option<String> {
    const MARKER: &str = "End of Watch:";

    let node = document
        .root_element()
        .descendants()
        .find(|n| n.value().as_text().is_some_and(|t| t.contains(MARKER)))?;

    let inline = node
        .value()
        .as_text()
        .map(|t| t.replace(MARKER, "").trim().to_string())
        .unwrap_or_default();
    if !inline.is_empty() {
        return Some(inline);
    }

    // Label wrapped in its own element: the date follows that element.
    node.parent().and_then(ElementRef::wrap).and_then(following_text)
}

fn first_long_paragraph(document: &Html) -> Option<String> {
    let p = Selector::parse("p").expect("valid selector");
    document.select(&p).find_map(|el| {
        let dense: usize = el.text().map(|t| t.trim().chars().count()).sum();
        (dense > BIO_MIN_CHARS).then(|| collapsed_text(&el))
    })
}

/// Paragraphs between the `Incident Details` heading and the next `h2`.
fn incident_details(document: &Html) -> Option<String> {
    let h2 = Selector::parse("h2").expect("valid selector");
    let header = document
        .select(&h2)
        .find(|el| collapsed_text(el).contains("Incident Details"))?;

    let paragraphs: Vec<String> = header
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.value().name() != "h2")
        .filter(|el| el.value().name() == "p")
        .map(|el| collapsed_text(&el))
        .filter(|s| !s.is_empty())
        .collect();

    (!paragraphs.is_empty()).then(|| paragraphs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use honoree_core::{normalize, InputMode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const OFFICER_URL: &str = "https://www.odmp.org/officer/12345-trooper-john-q-public";

    fn officer_page() -> String {
        let bio = "Trooper Public was killed in a vehicle crash while responding to a call \
                   for assistance on the interstate during a severe winter storm. He had \
                   served with the agency for eleven years and is survived by his wife and \
                   two children.";
        format!(
            r#"<html><body>
              <h1> Trooper John Q. Public </h1>
              <p><strong>Age:</strong> 38</p>
              <p><strong>Tour:</strong> 11 years</p>
              <p><strong>Badge:</strong> 1701</p>
              <p><strong>Cause:</strong> Automobile crash</p>
              <p>End of Watch: Friday, January 12, 2001</p>
              <p>Short paragraph.</p>
              <p>{bio}</p>
              <div>
                <h2>Incident Details</h2>
                <p>Cause: Automobile crash</p>
                <div>Weapon: Not available</div>
                <p>Offender: Not available</p>
                <h2>Agency</h2>
                <p>State Highway Patrol</p>
              </div>
            </body></html>"#
        )
    }

    #[test]
    fn test_parse_officer_page() {
        let profile = parse_officer_page(&officer_page(), OFFICER_URL);
        assert_eq!(profile.url, OFFICER_URL);
        assert_eq!(profile.name.as_deref(), Some("Trooper John Q. Public"));
        assert_eq!(profile.age.as_deref(), Some("38"));
        assert_eq!(profile.tour.as_deref(), Some("11 years"));
        assert_eq!(profile.badge.as_deref(), Some("1701"));
        assert_eq!(profile.cause.as_deref(), Some("Automobile crash"));
        assert_eq!(profile.end_of_watch.as_deref(), Some("Friday, January 12, 2001"));
        assert!(profile.bio.as_deref().unwrap().starts_with("Trooper Public was killed"));
        assert_eq!(
            profile.incident_details.as_deref(),
            Some("Cause: Automobile crash Offender: Not available")
        );
    }

    #[test]
    fn test_end_of_watch_in_its_own_label() {
        let html = "<div><strong>End of Watch:</strong> Monday, May 3, 1999</div>";
        let profile = parse_officer_page(html, OFFICER_URL);
        assert_eq!(profile.end_of_watch.as_deref(), Some("Monday, May 3, 1999"));
    }

    #[test]
    fn test_sparse_page_leaves_fields_empty() {
        let profile = parse_officer_page("<html><body><p>Nothing here</p></body></html>", OFFICER_URL);
        assert_eq!(
            profile,
            OfficerProfile {
                url: OFFICER_URL.to_string(),
                ..OfficerProfile::default()
            }
        );
    }

    #[test]
    fn test_profile_into_partial() {
        let profile = parse_officer_page(&officer_page(), OFFICER_URL);
        let partial = profile.into_partial(96.3).unwrap();
        assert_eq!(partial.source(), Source::Directory);
        assert_eq!(partial.get(Field::OdmpFuzzyScore).and_then(|v| v.as_number()), Some(96.3));
        assert_eq!(partial.get(Field::OdmpAge).and_then(|v| v.as_text()), Some("38"));
    }

    struct StubSite {
        officers: Vec<DirectoryListing>,
        listings: Arc<AtomicUsize>,
        pages: Arc<AtomicUsize>,
    }

    impl StubSite {
        fn new(officers: &[(&str, &str)]) -> Self {
            Self {
                officers: officers
                    .iter()
                    .map(|(name, url)| DirectoryListing {
                        name: name.to_string(),
                        url: url.to_string(),
                    })
                    .collect(),
                listings: Arc::new(AtomicUsize::new(0)),
                pages: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl DirectorySite for StubSite {
        async fn list_officers(&mut self, _state: &str) -> SourceResult<Vec<DirectoryListing>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            Ok(self.officers.clone())
        }

        async fn officer_page(&mut self, _url: &str) -> SourceResult<String> {
            self.pages.fetch_add(1, Ordering::SeqCst);
            Ok(officer_page())
        }
    }

    #[tokio::test]
    async fn test_match_fetches_profile_and_caches_listing() {
        let site = StubSite::new(&[
            ("Mary Jones", "https://www.odmp.org/officer/1-mary-jones"),
            ("Trooper John Q Public", OFFICER_URL),
        ]);
        let listings = Arc::clone(&site.listings);
        let pages = Arc::clone(&site.pages);
        let mut adapter = MemorialDirectoryAdapter::new(site, "texas", FuzzyMatcher::default());

        let name = normalize("John Q. Public", InputMode::Person);
        let partial = adapter.fetch(&LookupRequest::new(&name)).await.unwrap();
        assert_eq!(
            partial.get(Field::OdmpUrl).and_then(|v| v.as_text()),
            Some(OFFICER_URL)
        );
        assert_eq!(partial.get(Field::OdmpFuzzyScore).and_then(|v| v.as_number()), Some(100.0));

        let other = normalize("Nobody Atall", InputMode::Person);
        let err = adapter.fetch(&LookupRequest::new(&other)).await.unwrap_err();
        assert!(matches!(err, SourceError::NoMatch { best_score: Some(_), .. }));

        assert_eq!(listings.load(Ordering::SeqCst), 1);
        assert_eq!(pages.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_listing_is_no_data() {
        let mut adapter =
            MemorialDirectoryAdapter::new(StubSite::new(&[]), "wyoming", FuzzyMatcher::default());
        let name = normalize("John Smith", InputMode::Person);
        let err = adapter.fetch(&LookupRequest::new(&name)).await.unwrap_err();
        assert!(matches!(err, SourceError::NoData(ref s) if s == "wyoming"));
        assert!(err.is_miss());
    }
}
