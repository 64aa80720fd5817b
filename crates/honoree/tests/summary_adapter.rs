//! Summary adapter against a mock biography page and chat API.

use honoree::acquisition::http_client::HttpClient;
use honoree::llm::ChatClient;
use honoree::sources::summary::LinkPolicy;
use honoree::sources::{LookupRequest, SourceAdapter, SummaryAdapter};
use honoree::SourceError;
use honoree_core::{normalize, Field, InputMode};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BIO_PAGE: &str = r#"<html><body><div id="mw-content-text">
<p>Albert Einstein (14 March 1879 – 18 April 1955) was a German-born theoretical physicist
who is best known for developing the theory of relativity.</p>
<p>He received the 1921 Nobel Prize in Physics for his services to theoretical physics.</p>
</div></body></html>"#;

fn adapter(server: &MockServer) -> SummaryAdapter {
    let http = HttpClient::new(5_000).unwrap();
    let chat = ChatClient::new(http.clone(), "test-key", "mistral-medium-latest")
        .with_base_url(&server.uri());
    SummaryAdapter::new(http, chat).with_link_policy(LinkPolicy::default().allow("127.0.0.1"))
}

fn chat_reply(content: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "cmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content.to_string()}}]
    }))
}

#[tokio::test]
async fn test_page_summarized_into_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Albert_Einstein"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BIO_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "mistral-medium-latest",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(chat_reply(json!({
            "summary": "Albert Einstein was a theoretical physicist.",
            "education": ["ETH Zurich", "University of Zurich"],
            "dob": "1879-03-14",
            "dod": "1955-04",
            "place_of_birth": "Ulm, Germany",
            "place_of_death": "Princeton, New Jersey",
            "gender": "male",
            "involved_in_sports": "no",
            "involved_in_politics": "Yes",
            "involved_in_military": "no",
            "involved_in_music": "yes"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let name = normalize("Albert Einstein", InputMode::Person);
    let link = format!("{}/wiki/Albert_Einstein", server.uri());
    let request = LookupRequest::new(&name).with_link(Some(&link));
    let partial = adapter(&server).fetch(&request).await.unwrap();

    let text = |f| partial.get(f).and_then(|v| v.as_text());
    assert_eq!(text(Field::AiSummary), Some("Albert Einstein was a theoretical physicist."));
    assert_eq!(text(Field::AiEducation), Some("ETH Zurich, University of Zurich"));
    assert_eq!(text(Field::AiDob), Some("1879-03-14"));
    assert_eq!(text(Field::AiDod), Some("1955-04-01"));
    assert_eq!(text(Field::AiInvolvedInPolitics), Some("yes"));
    assert_eq!(text(Field::AiInvolvedInMusic), Some("yes"));
}

#[tokio::test]
async fn test_missing_and_unsupported_links() {
    let server = MockServer::start().await;
    let name = normalize("Albert Einstein", InputMode::Person);

    let err = adapter(&server).fetch(&LookupRequest::new(&name)).await.unwrap_err();
    assert!(matches!(err, SourceError::MissingLink));

    let request = LookupRequest::new(&name).with_link(Some("https://example.com/einstein"));
    let err = adapter(&server).fetch(&request).await.unwrap_err();
    assert!(matches!(err, SourceError::UnsupportedLink(_)));
}

#[tokio::test]
async fn test_short_page_is_insufficient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Stub"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Too short.</p>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(chat_reply(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let name = normalize("Stub", InputMode::Person);
    let link = format!("{}/wiki/Stub", server.uri());
    let err = adapter(&server)
        .fetch(&LookupRequest::new(&name).with_link(Some(&link)))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InsufficientContent { chars: 10, .. }));
}

#[tokio::test]
async fn test_chat_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Albert_Einstein"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BIO_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Unauthorized", "request_id": "abc"
        })))
        .mount(&server)
        .await;

    let name = normalize("Albert Einstein", InputMode::Person);
    let link = format!("{}/wiki/Albert_Einstein", server.uri());
    let err = adapter(&server)
        .fetch(&LookupRequest::new(&name).with_link(Some(&link)))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Api(ref m) if m.contains("401") && m.contains("Unauthorized")));
}
