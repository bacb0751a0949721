//! End-to-end extraction against a simulated Bedrock Converse endpoint.

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use slipscan_core::config::BedrockConfig;
use slipscan_core::inference::AwsCredentials;
use slipscan_core::{
    BedrockProvider, Config, ExtractionSession, FailureStage, InferenceClient, PipelineError,
    SessionState, SlipFormat,
};
use wiremock::matchers::{header, header_exists, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_ID: &str = "us.meta.llama3-2-90b-instruct-v1:0";

fn client_for(endpoint: &str, timeout: Duration) -> InferenceClient {
    let provider = BedrockProvider::new(
        AwsCredentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
        "us-east-1",
        MODEL_ID,
    )
    .with_endpoint(endpoint)
    .with_timeout(timeout);
    InferenceClient::new(Box::new(provider), &BedrockConfig::default())
}

fn receipt_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

#[tokio::test]
async fn well_formed_response_returns_text_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/model/.+/converse$"))
        .and(header("content-type", "application/json"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"content": [{"text": "Date: 01/02/2024\nAmount: 500 THB"}]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let result = client
        .extract(&receipt_png(20, 10), SlipFormat::Png)
        .await
        .unwrap();

    assert_eq!(result.text, "Date: 01/02/2024\nAmount: 500 THB");
    assert_eq!(result.model, MODEL_ID);
    assert_eq!(result.tokens_used, None);
}

#[tokio::test]
async fn request_carries_image_and_prompt_in_one_user_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"role": "assistant", "content": [{"text": "ok"}]}},
            "usage": {"inputTokens": 100, "outputTokens": 12, "totalTokens": 112}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let bytes = [0x89, b'P', b'N', b'G'];
    let result = client.extract(&bytes, SlipFormat::Png).await.unwrap();
    assert_eq!(result.tokens_used, Some(112));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let authorization = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(authorization.contains("/us-east-1/bedrock/aws4_request"));

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");

    let content = messages[0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["image"]["format"], "png");
    assert_eq!(content[0]["image"]["source"]["bytes"], "iVBORw==");
    assert!(content[1]["text"].as_str().unwrap().contains("subtract 543"));
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(&endpoint, Duration::from_secs(5));
    let err = client
        .extract(&receipt_png(4, 4), SlipFormat::Png)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transport { status_code: None, .. }));
    assert!(err.to_string().contains("Bedrock request failed"));
}

#[tokio::test]
async fn slow_endpoint_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"output": {"message": {"content": [{"text": "late"}]}}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_millis(200));
    let err = client
        .extract(&receipt_png(4, 4), SlipFormat::Png)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Transport { .. }));
}

#[tokio::test]
async fn rejected_credentials_are_auth_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "The security token included in the request is invalid."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let err = client
        .extract(&receipt_png(4, 4), SlipFormat::Png)
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert!(err.to_string().contains("security token"));
}

#[tokio::test]
async fn throttling_is_surfaced_once_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let err = client
        .extract(&receipt_png(4, 4), SlipFormat::Png)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Transport {
            status_code: Some(429),
            ..
        }
    ));
}

#[tokio::test]
async fn unexpected_shape_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"content": [{"toolUse": {"name": "x"}}]}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let err = client
        .extract(&receipt_png(4, 4), SlipFormat::Png)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::MalformedResponse { .. }));
}

#[tokio::test]
async fn session_recovers_after_failed_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"content": [{"text": "Date: 15/03/2024\nAmount: 1,250.00 THB"}]}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), Duration::from_secs(5));
    let mut session = ExtractionSession::new(&Config::default());
    assert!(session.upload(receipt_png(600, 300)).await.is_some());

    assert!(session.extract(&client).await.is_none());
    assert_eq!(
        session.state(),
        SessionState::Failed(FailureStage::Extraction)
    );

    let text = session.extract(&client).await.map(str::to_string);
    assert_eq!(text.as_deref(), Some("Date: 15/03/2024\nAmount: 1,250.00 THB"));
    assert_eq!(session.state(), SessionState::Succeeded);
}
