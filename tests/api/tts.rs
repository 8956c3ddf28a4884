use crate::helpers::spawn_app;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

fn wav_bytes() -> Vec<u8> {
    b"RIFF....WAVEfmt ".to_vec()
}

#[tokio::test]
async fn tts_synthesizes_and_hosts_the_audio() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(wav_bytes()))
        .expect(1)
        .mount(&app.tts_server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/magnet-audio/audio/.+\.wav$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.storage_server)
        .await;

    let form = reqwest::multipart::Form::new().text("text", "Welcome to the show.");

    // Act
    let response = app.post_tts(form).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://magnet-audio.s3.us-east-1.amazonaws.com/audio/"));
    assert!(url.ends_with(".wav"));
}

#[tokio::test]
async fn tts_prefixed_voice_pins_the_model() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(wav_bytes()))
        .mount(&app.tts_server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/magnet-audio/audio/.+\.wav$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.storage_server)
        .await;

    let form = reqwest::multipart::Form::new()
        .text("text", "Welcome to the show.")
        .text("voice", "other-vendor/model-x:alex")
        .text("speed", "1.2");

    // Act
    app.post_tts(form).await;

    // Assert
    let requests = app.tts_server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "other-vendor/model-x");
    assert_eq!(sent["voice"], "other-vendor/model-x:alex");
    assert_eq!(sent["response_format"], "wav");
    assert!((sent["speed"].as_f64().unwrap() - 1.2).abs() < 1e-6);
}

#[tokio::test]
async fn tts_reference_audio_is_uploaded_and_its_voice_uri_used() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/uploads/audio/voice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "uri": "speech:reference:abc123" })),
        )
        .expect(1)
        .mount(&app.tts_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(wav_bytes()))
        .expect(1)
        .mount(&app.tts_server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/magnet-audio/audio/.+\.wav$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.storage_server)
        .await;

    let reference = reqwest::multipart::Part::bytes(wav_bytes())
        .file_name("reference.wav")
        .mime_str("audio/wav")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("text", "Welcome to the show.")
        .text("referenceText", "A short sample sentence.")
        .part("referenceAudio", reference);

    // Act
    let response = app.post_tts(form).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let requests = app.tts_server.received_requests().await.unwrap();

    let upload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(upload["audio"]
        .as_str()
        .unwrap()
        .starts_with("data:audio/wav;base64,"));
    assert_eq!(upload["text"], "A short sample sentence.");

    let synthesis: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(synthesis["voice"], "speech:reference:abc123");
}

#[tokio::test]
async fn tts_maps_an_exhausted_quota_to_a_403() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string(r#"{"code":30011,"message":"insufficient balance"}"#),
        )
        .mount(&app.tts_server)
        .await;

    let form = reqwest::multipart::Form::new().text("text", "Welcome to the show.");

    let response = app.post_tts(form).await;

    assert_eq!(403, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("API Limit Reached"));
}

#[tokio::test]
async fn tts_passes_other_vendor_errors_through() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"message":"bad voice"}"#))
        .mount(&app.tts_server)
        .await;

    let form = reqwest::multipart::Form::new().text("text", "Welcome to the show.");

    let response = app.post_tts(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("API Error: 400"));
}

#[tokio::test]
async fn tts_rejects_a_missing_text_field() {
    let app = spawn_app().await;

    let form = reqwest::multipart::Form::new().text("voice", "some-model:alex");

    let response = app.post_tts(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Text is required");
}

#[tokio::test]
async fn tts_rejects_an_oversized_reference_recording() {
    let app = spawn_app().await;

    // One byte past the configured cap
    let oversized = vec![0u8; 1025];
    let reference = reqwest::multipart::Part::bytes(oversized)
        .file_name("reference.wav")
        .mime_str("audio/wav")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("text", "Welcome to the show.")
        .part("referenceAudio", reference);

    let response = app.post_tts(form).await;

    assert_eq!(413, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Reference audio exceeds"));
}
