use crate::helpers::{newsletter_row, spawn_app};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn fetch_returns_the_stored_newsletter() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/newsletters"))
        .and(query_param("template_key", "eq.operators-notebook"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(vec![newsletter_row("operators-notebook")]),
        )
        .expect(1)
        .mount(&app.document_server)
        .await;

    // Act
    let response = app.get_newsletter("operators-notebook").await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["templateKey"], "operators-notebook");
    assert_eq!(body["title"], "The Operator's Notebook");
    assert_eq!(body["content"], "<p>Welcome aboard.</p>");
    // Stored HTML rides along as a single rich-text run
    assert_eq!(body["contentRichText"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["contentRichText"][0]["plain_text"],
        "<p>Welcome aboard.</p>"
    );
    assert_eq!(body["annualPrice"], "$96");
    assert_eq!(body["benefits"].as_array().unwrap().len(), 2);
    assert_eq!(body["benefitsPrompt"], "List the benefits of {content}");
}

#[tokio::test]
async fn basic_projection_omits_the_content_fields() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/newsletters"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(vec![newsletter_row("operators-notebook")]),
        )
        .mount(&app.document_server)
        .await;

    let response = app.get_newsletter("operators-notebook?basic=true").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("content").is_none());
    assert!(body.get("contentRichText").is_none());
    assert_eq!(body["title"], "The Operator's Notebook");
    assert_eq!(body["ctaText"], "Subscribe now");
}

#[tokio::test]
async fn exclude_prompts_removes_the_prompt_fields() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/newsletters"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(vec![newsletter_row("operators-notebook")]),
        )
        .mount(&app.document_server)
        .await;

    // The flag counts as set even without a value
    let response = app
        .get_newsletter("operators-notebook?excludePrompts")
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("benefitsPrompt").is_none());
    assert!(body.get("consumePrompt").is_none());
    assert_eq!(body["content"], "<p>Welcome aboard.</p>");
}

#[tokio::test]
async fn fetch_returns_a_404_for_an_unknown_template_key() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/newsletters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&app.document_server)
        .await;

    let response = app.get_newsletter("missing").await;

    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Newsletter not found");
}

#[tokio::test]
async fn fetch_returns_a_400_for_a_blank_template_key() {
    let app = spawn_app().await;

    let response = app.get_newsletter("%20").await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Newsletter ID is required");
}

#[tokio::test]
async fn update_sends_only_the_patched_columns() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/newsletters"))
        .and(query_param("id", "eq.page-1"))
        .and(header("Prefer", "return=representation"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "id": "page-1" }])),
        )
        .expect(1)
        .mount(&app.document_server)
        .await;

    // Act
    let response = app
        .post_newsletter_update(serde_json::json!({
            "pageId": "page-1",
            "data": { "title": "New title" }
        }))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let requests = app.document_server.received_requests().await.unwrap();
    let patch: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let columns = patch.as_object().unwrap();
    assert_eq!(columns["title"], "New title");
    // Untouched fields stay out of the update; only the stamp rides along
    assert_eq!(columns.len(), 2);
    assert!(columns.contains_key("updated_at"));
}

#[tokio::test]
async fn update_rejects_requests_missing_required_fields() {
    let app = spawn_app().await;

    let test_cases = vec![
        (
            serde_json::json!({ "data": { "title": "x" } }),
            "Page ID is required",
        ),
        (serde_json::json!({ "pageId": "page-1" }), "Update data is required"),
        (
            serde_json::json!({ "pageId": "page-1", "data": {} }),
            "Update data is required",
        ),
    ];

    for (invalid_body, expected_message) in test_cases {
        let response = app.post_newsletter_update(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "expected a 400 for {}",
            expected_message
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], expected_message);
    }
}

#[tokio::test]
async fn update_rejects_an_oversized_body() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter_update(serde_json::json!({
            "pageId": "page-1",
            "data": { "content": "x".repeat(8192) }
        }))
        .await;

    assert_eq!(413, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Request body is too large");
}

#[tokio::test]
async fn update_returns_a_404_for_an_unknown_page() {
    let app = spawn_app().await;

    // An empty representation means no row matched the filter
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/newsletters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&app.document_server)
        .await;

    let response = app
        .post_newsletter_update(serde_json::json!({
            "pageId": "missing-page",
            "data": { "title": "New title" }
        }))
        .await;

    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Newsletter not found");
}
