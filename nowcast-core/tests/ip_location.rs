//! Integration tests for the IP-based location backend using wiremock.

use std::time::Duration;

use nowcast_core::{
    Coordinates, ErrorKind, LocationService,
    location::{IpLocation, one_shot_fix},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> IpLocation {
    IpLocation::with_endpoint(&format!("{}/json", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_ip_location_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "city": "London",
            "region": "England",
            "country": "GB",
            "loc": "51.5085,-0.1257",
            "timezone": "Europe/London"
        })))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let fix = one_shot_fix(&backend).await.unwrap();

    assert_eq!(fix, Coordinates::new(51.5085, -0.1257));
}

#[tokio::test]
async fn test_ip_location_without_loc_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "10.0.0.1",
            "bogon": true
        })))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.request_location().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocationUnavailable);
}

#[tokio::test]
async fn test_ip_location_rate_limited_is_other() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = one_shot_fix(&backend).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocationOther);
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_ip_location_unreadable_body_is_other() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.request_location().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocationOther);
}

#[tokio::test]
async fn test_ip_location_malformed_loc_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "London",
            "loc": "51.5"
        })))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = one_shot_fix(&backend).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocationUnavailable);
}

#[tokio::test]
async fn test_ip_location_unreachable_is_unavailable() {
    // Port 9 (discard) on loopback is not expected to have an HTTP server.
    let backend = IpLocation::with_endpoint("http://127.0.0.1:9/json", Duration::from_secs(2)).unwrap();

    let err = backend.request_location().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LocationUnavailable);
}
