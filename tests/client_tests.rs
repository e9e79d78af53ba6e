//! Wire tests for `AviaClient` against a local HTTP stub
//!
//! The stub answers every request with one fixed status and body and keeps
//! the request lines it received, so the tests can check both the query the
//! client sends and how it handles the reply.

use aviasky::{AviaClient, AviaError, ClientConfig, SearchBackend, SearchQuery};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct Stub {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    /// Request targets (path and query) received so far
    fn targets(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn start_stub(status: u16, body: &'static str) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => raw.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&raw);
                if let Some(target) = head
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                {
                    seen.lock().unwrap().push(target.to_string());
                }

                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Stub {
        endpoint: format!("http://{}/fn", addr),
        requests,
    }
}

fn client_for(stub: &Stub) -> AviaClient {
    let mut config = ClientConfig::with_endpoint(&stub.endpoint).unwrap();
    config.system_proxy = false;
    AviaClient::new(config).unwrap()
}

const FLIGHTS_BODY: &str = r#"{
    "flights": [{
        "id": "SU2108", "airline": "Aeroflot", "origin": "MOW", "destination": "PAR",
        "departure_time": "08:30", "arrival_time": "11:45", "duration": "3h 15m",
        "price": 25650, "currency": "RUB", "stops": 0, "aircraft": "Airbus A320"
    }],
    "search_params": {"origin": "MOW", "destination": "PAR", "date": "2025-08-15"}
}"#;

#[tokio::test]
async fn test_search_sends_canonical_query() {
    let stub = start_stub(200, FLIGHTS_BODY).await;
    let client = client_for(&stub);

    let query = SearchQuery {
        origin: "MOW".to_string(),
        destination: "PAR".to_string(),
        depart_date: "2025-08-15".to_string(),
    };
    let flights = client.search_flights(&query).await.unwrap();

    assert_eq!(flights.len(), 1);
    assert_eq!(flights[0].id, "SU2108");
    assert_eq!(
        stub.targets(),
        vec!["/fn?action=search&origin=MOW&destination=PAR&depart_date=2025-08-15".to_string()]
    );
}

#[tokio::test]
async fn test_fetch_cities_sends_action() {
    let stub = start_stub(
        200,
        r#"{"cities": [{"code": "PAR", "name": "Paris", "country": "France"}]}"#,
    )
    .await;
    let cities = client_for(&stub).fetch_cities().await.unwrap();

    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].code, "PAR");
    assert_eq!(stub.targets(), vec!["/fn?action=cities".to_string()]);
}

#[tokio::test]
async fn test_fetch_cities_matching_sends_filter() {
    let stub = start_stub(
        200,
        r#"{"cities": [{"code": "LON", "name": "London", "country": "UK"}]}"#,
    )
    .await;
    let cities = client_for(&stub).fetch_cities_matching("lon don").await.unwrap();

    assert_eq!(cities[0].name, "London");
    assert_eq!(stub.targets(), vec!["/fn?action=cities&q=lon+don".to_string()]);
}

#[tokio::test]
async fn test_missing_fields_decode_to_empty_lists() {
    let stub = start_stub(200, r#"{"status": "ok"}"#).await;
    let client = client_for(&stub);

    assert!(client.fetch_cities().await.unwrap().is_empty());

    let query = SearchQuery {
        origin: "LON".to_string(),
        destination: "PAR".to_string(),
        depart_date: "2025-08-15".to_string(),
    };
    assert!(client.search_flights(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_maps_to_bad_status() {
    let stub = start_stub(502, r#"{"error": "upstream"}"#).await;
    let client = client_for(&stub);

    match client.fetch_cities().await {
        Err(AviaError::BadStatus { action, status }) => {
            assert_eq!(action, "cities");
            assert_eq!(status, 502);
        }
        other => panic!("expected BadStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_a_json_error() {
    let stub = start_stub(200, "<html>not json</html>").await;
    let result = client_for(&stub).fetch_cities().await;
    assert!(matches!(result, Err(AviaError::JsonError(_))));
}

#[tokio::test]
async fn test_telegram_url() {
    let stub = start_stub(200, r#"{"telegram_url": "https://t.me/aviasky_bot"}"#).await;
    let client = client_for(&stub);

    assert_eq!(
        client.fetch_telegram_url().await.unwrap(),
        "https://t.me/aviasky_bot"
    );
    assert_eq!(stub.targets(), vec!["/fn?action=telegram".to_string()]);
}

#[tokio::test]
async fn test_empty_telegram_url_is_missing() {
    let stub = start_stub(200, r#"{"telegram_url": ""}"#).await;
    let result = client_for(&stub).fetch_telegram_url().await;
    assert!(matches!(result, Err(AviaError::MissingMessagingUrl)));
}
