use crate::helpers::spawn_app;

#[tokio::test]
async fn channels_returns_the_built_in_catalog() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/channels", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();

    let channels = body.as_array().unwrap();
    assert_eq!(channels.len(), 1);

    let channel = &channels[0];
    assert!(channel["id"].is_string());
    assert!(channel["name"].is_string());
    assert!(channel["creatorName"].is_string());
    assert_eq!(channel["isSubscribed"], false);

    let episodes = channel["episodes"].as_array().unwrap();
    assert_eq!(episodes.len(), 3);
    for episode in episodes {
        assert!(episode["id"].is_string());
        assert!(episode["title"].is_string());
        assert!(!episode["aiSummary"].as_str().unwrap().is_empty());
        assert!(episode["progress"].is_u64());
    }
}
