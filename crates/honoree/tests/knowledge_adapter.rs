//! Knowledge-base adapter against a mock Wikidata.

use honoree::acquisition::http_client::HttpClient;
use honoree::sources::{KnowledgeBaseAdapter, LookupRequest, SourceAdapter};
use honoree::SourceError;
use honoree_core::{normalize, Field, InputMode};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(server: &MockServer) -> KnowledgeBaseAdapter {
    KnowledgeBaseAdapter::with_endpoints(
        HttpClient::new(5_000).unwrap(),
        &format!("{}/w/api.php", server.uri()),
        &format!("{}/wiki/Special:EntityData", server.uri()),
    )
}

async fn mount_einstein(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "wbsearchentities"))
        .and(query_param("search", "Albert Einstein"))
        .and(query_param("language", "en"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search": [
                {"id": "Q937", "label": "Albert Einstein"},
                {"id": "Q123", "label": "Albert Einstein (disambiguation)"}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wiki/Special:EntityData/Q937.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": {"Q937": {
                "claims": {
                    "P106": [{"mainsnak": {"datavalue": {"value": {"id": "Q169470"}}}}],
                    "P21": [{"mainsnak": {"datavalue": {"value": {"id": "Q6581097"}}}}],
                    "P569": [{"mainsnak": {"datavalue": {"value": {"time": "+1879-03-14T00:00:00Z"}}}}],
                    "P570": [{"mainsnak": {"datavalue": {"value": {"time": "+1955-04-18T00:00:00Z"}}}}]
                },
                "sitelinks": {"enwiki": {"title": "Albert Einstein",
                                         "url": "https://en.wikipedia.org/wiki/Albert_Einstein"}}
            }}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "wbgetentities"))
        .and(query_param("ids", "Q169470|Q6581097"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": {
                "Q169470": {"labels": {"en": {"language": "en", "value": "physicist"}}},
                "Q6581097": {"labels": {"en": {"language": "en", "value": "male"}}}
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_entity_found_and_labeled() {
    let server = MockServer::start().await;
    mount_einstein(&server).await;

    let name = normalize("Albert Einstein", InputMode::Person);
    let partial = adapter(&server)
        .fetch(&LookupRequest::new(&name))
        .await
        .unwrap();

    let text = |f| partial.get(f).and_then(|v| v.as_text());
    assert_eq!(text(Field::WikidataOccupation), Some("physicist"));
    assert_eq!(text(Field::WikidataSex), Some("male"));
    assert_eq!(text(Field::WikidataRace), None);
    assert_eq!(text(Field::WikidataBirthDate), Some("1879-03-14"));
    assert_eq!(text(Field::WikidataDeathDate), Some("1955-04-18"));
    assert_eq!(
        text(Field::WikipediaLink),
        Some("https://en.wikipedia.org/wiki/Albert_Einstein")
    );
}

#[tokio::test]
async fn test_no_search_hit_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search": []})))
        .mount(&server)
        .await;

    let name = normalize("Zzyzx Qwerty", InputMode::Person);
    let err = adapter(&server)
        .fetch(&LookupRequest::new(&name))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NotFound(ref n) if n == "Zzyzx Qwerty"));
    assert!(err.is_miss());
}

#[tokio::test]
async fn test_server_error_is_not_a_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let name = normalize("Albert Einstein", InputMode::Person);
    let err = adapter(&server)
        .fetch(&LookupRequest::new(&name))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Http { status: 503, .. }));
    assert!(!err.is_miss());
}
