//! HttpTransport integration tests
//!
//! Runs the real reqwest transport against a local mock server.

use mixpanel::config::HttpConfig;
use mixpanel::{
    DataClient, Endpoints, ExportQuery, HttpTransport, TrackEvent, TrackOptions, TrackingClient,
};
use mockito::{Matcher, Server};
use std::sync::Arc;

fn create_transport() -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(&HttpConfig::default()).unwrap())
}

#[tokio::test]
async fn test_track_get_reaches_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/track/")
        .match_query(Matcher::Regex("^data=[A-Za-z0-9%]+&verbose=1$".to_string()))
        .with_status(200)
        .with_body(r#"{"status":1,"error":null}"#)
        .create_async()
        .await;

    let client = TrackingClient::with_transport(
        "token123",
        Endpoints::single_host(&server.url()),
        create_transport(),
    );
    let options = TrackOptions {
        verbose: true,
        ..Default::default()
    };

    let body = client
        .track(&TrackEvent::new("u1", "Signed Up"), &options)
        .await
        .unwrap();

    assert_eq!(body, br#"{"status":1,"error":null}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_batch_post_is_form_encoded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/track")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::Regex("^data=".to_string()))
        .with_status(200)
        .with_body("1")
        .expect(2)
        .create_async()
        .await;

    let client = TrackingClient::with_transport(
        "token123",
        Endpoints::single_host(&server.url()),
        create_transport(),
    );
    let events: Vec<_> = (0..51)
        .map(|i| TrackEvent::new(i as i64, "Played Song"))
        .collect();

    let summary = client
        .track_batch(&events, &TrackOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.chunks_sent, 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_body_is_returned_raw() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/2.0/export/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("from_date".into(), "2012-02-14".into()),
            Matcher::UrlEncoded("to_date".into(), "2012-02-14".into()),
            Matcher::UrlEncoded("api_key".into(), "key".into()),
            Matcher::Regex("sig=[0-9a-f]{32}".to_string()),
        ]))
        .with_status(400)
        .with_body(r#"{"error": "Invalid signature"}"#)
        .create_async()
        .await;

    let client = DataClient::with_transport(
        "key",
        "secret",
        Endpoints::single_host(&server.url()),
        create_transport(),
    );

    let body = client
        .export(&ExportQuery::new("2012-02-14", "2012-02-14"))
        .await
        .unwrap();

    assert_eq!(body, br#"{"error": "Invalid signature"}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_from_custom_client() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/track/")
        .match_header("user-agent", "custom-agent/1.0")
        .match_query(Matcher::Regex("^data=".to_string()))
        .with_status(200)
        .with_body("1")
        .create_async()
        .await;

    let http = reqwest::Client::builder()
        .user_agent("custom-agent/1.0")
        .build()
        .unwrap();
    let client = TrackingClient::with_transport(
        "token123",
        Endpoints::single_host(&server.url()),
        Arc::new(HttpTransport::from_client(http)),
    );

    let body = client
        .track(&TrackEvent::new("u1", "Signed Up"), &TrackOptions::default())
        .await
        .unwrap();

    assert_eq!(body, b"1");
    mock.assert_async().await;
}
