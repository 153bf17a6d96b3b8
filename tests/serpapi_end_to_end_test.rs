//! End-to-end tests through the real SerpAPI client against a mock server

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use image_lookup_relay::{
    api::{build_router, init_app_state},
    config::Config,
};
use mockito::Matcher;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

fn config_for(server: &mockito::ServerGuard) -> Config {
    let mut config = Config::default();
    config.provider.endpoint = format!("{}/search.json", server.url());
    config.provider.api_key = Some(SecretString::new("e2e-key".to_string()));
    config
}

async fn identify(config: Config, image: &str) -> (StatusCode, Value) {
    let app = build_router(init_app_state(config).unwrap(), 1024 * 1024);
    let request = Request::builder()
        .method("POST")
        .uri("/identify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "image": image }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_lookup_through_serpapi() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("engine".into(), "google_lens".into()),
            Matcher::UrlEncoded("url".into(), "data:image/jpeg;base64,AAAA".into()),
            Matcher::UrlEncoded("api_key".into(), "e2e-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "search_metadata": { "status": "Success" },
                "visual_matches": [
                    { "position": 1, "title": "X", "link": "l", "thumbnail": "t", "source": "s" }
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let (status, body) = identify(config_for(&server), "data:image/jpeg;base64,AAAA").await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "results": [{ "title": "X", "thumbnail": "t", "link": "l", "source": "s" }] })
    );
}

#[tokio::test]
async fn test_provider_error_status_surfaces_as_upstream_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search.json")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("service unavailable")
        .create_async()
        .await;

    let (status, body) = identify(config_for(&server), "AAAA").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert!(body["details"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_provider_no_results_document_is_empty_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Google Lens hasn't returned any results for this query."}"#)
        .create_async()
        .await;

    let (status, body) = identify(config_for(&server), "AAAA").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "results": [] }));
}
