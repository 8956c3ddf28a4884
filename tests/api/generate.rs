use crate::helpers::spawn_app;
use claims::assert_some;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn completion_response() -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "A crisp weekly briefing." }
        }],
        "usage": {
            "prompt_tokens": 1000,
            "completion_tokens": 500,
            "total_tokens": 1500,
            "prompt_tokens_details": { "cached_tokens": 200 }
        }
    })
}

#[tokio::test]
async fn generate_returns_the_completion_with_usage_and_cost() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response()))
        .expect(1)
        .mount(&app.ai_server)
        .await;

    // Act
    let response = app
        .post_generate(serde_json::json!({
            "prompt": "Summarize: {content}",
            "content": "A newsletter about operating software."
        }))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["generatedText"], "A crisp weekly briefing.");
    assert_some!(body.get("usage"));
    assert_eq!(body["usage"]["prompt_tokens"], 1000);
    // All 1000 prompt tokens bill at the input rate; the reported cached
    // share carries no discount.
    let expected_cost = (1000.0 * 0.25 + 500.0 * 2.0) / 1_000_000.0;
    assert!((body["cost"].as_f64().unwrap() - expected_cost).abs() < 1e-12);
    assert!(body["duration"].is_u64());
}

#[tokio::test]
async fn generate_strips_html_before_substituting_the_placeholder() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response()))
        .mount(&app.ai_server)
        .await;

    // Act
    app.post_generate(serde_json::json!({
        "prompt": "Summarize: {content}",
        "content": "<p>Hello &amp; welcome</p><p>Second paragraph</p>"
    }))
    .await;

    // Assert
    let requests = app.ai_server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        sent["messages"][0]["content"],
        "Summarize: Hello & welcome\nSecond paragraph"
    );
}

#[tokio::test]
async fn generate_substitutes_only_the_first_placeholder() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_response()))
        .mount(&app.ai_server)
        .await;

    // Act
    app.post_generate(serde_json::json!({
        "prompt": "Summarize: {content}. Then repeat {content} verbatim.",
        "content": "the article"
    }))
    .await;

    // Assert
    let requests = app.ai_server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        sent["messages"][0]["content"],
        "Summarize: the article. Then repeat {content} verbatim."
    );
}

#[tokio::test]
async fn generate_rejects_requests_missing_prompt_or_content() {
    let app = spawn_app().await;

    let test_cases = vec![
        serde_json::json!({}),
        serde_json::json!({ "prompt": "Summarize: {content}" }),
        serde_json::json!({ "content": "Some content" }),
        serde_json::json!({ "prompt": "", "content": "Some content" }),
    ];

    for invalid_body in test_cases {
        let response = app.post_generate(invalid_body).await;

        assert_eq!(400, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Prompt and content are required");
    }
}

#[tokio::test]
async fn generate_returns_a_500_when_the_vendor_fails() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.ai_server)
        .await;

    let response = app
        .post_generate(serde_json::json!({
            "prompt": "Summarize: {content}",
            "content": "Some content"
        }))
        .await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to generate content");
}
