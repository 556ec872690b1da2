//! Integration tests for HttpFeedClient using wiremock

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use macrowatch::feed::{FeedError, FeedSource, HttpFeedClient};
use macrowatch::models::Impact;

fn sample_body() -> serde_json::Value {
    serde_json::json!([
        {
            "title": "Non-Farm Payrolls",
            "country": "USD",
            "date": "2025-06-06T08:30:00-04:00",
            "impact": "High",
            "forecast": "185K",
            "previous": "177K"
        },
        {
            "title": "ECB Press Conference",
            "country": "EUR",
            "date": "2025-06-05T08:45:00-04:00",
            "impact": "High",
            "forecast": "",
            "previous": ""
        },
        {
            "title": "Broken Row",
            "country": "USD",
            "date": "sometime next week",
            "impact": "High"
        },
        {
            "title": "Mystery Impact",
            "country": "USD",
            "date": "2025-06-05T10:00:00-04:00",
            "impact": "mega"
        }
    ])
}

#[tokio::test]
async fn test_fetch_parses_feed_and_skips_bad_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .mount(&server)
        .await;

    let client = HttpFeedClient::new(
        format!("{}/calendar.json", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let events = client.fetch().await.unwrap();

    // Four records served, two survive conversion.
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title, "Non-Farm Payrolls");
    assert_eq!(events[0].impact, Impact::High);
    assert_eq!(events[0].forecast.as_deref(), Some("185K"));

    // Empty forecast/previous strings become None.
    assert_eq!(events[1].title, "ECB Press Conference");
    assert!(events[1].forecast.is_none());
    assert!(events[1].previous.is_none());
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = HttpFeedClient::new(
        format!("{}/calendar.json", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let result = client.fetch().await;
    assert!(matches!(result, Err(FeedError::Status { status: 503 })));
}

#[tokio::test]
async fn test_non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = HttpFeedClient::new(
        format!("{}/calendar.json", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let result = client.fetch().await;
    assert!(matches!(result, Err(FeedError::Decode { .. })));
}

#[tokio::test]
async fn test_empty_feed_is_valid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = HttpFeedClient::new(
        format!("{}/calendar.json", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    let events = client.fetch().await.unwrap();
    assert!(events.is_empty());
}
