//! HTTP gateway tests against a local tiny_http server

use std::sync::mpsc::{channel, Receiver};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server};

use configdns::{
    ClientConfig, DnsRecord, HttpZoneGateway, PollPolicy, RecordType, SaveOptions, Zone, ZoneError,
    ZoneGateway,
};

const AUTH: &str = "EG1-HMAC-SHA256 client_token=akab-client;access_token=akab-access";

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/zone_files/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).expect("Failed to read fixture")
}

/// What the server saw for one request
#[derive(Debug)]
struct Seen {
    method: String,
    url: String,
    authorization: Option<String>,
    body: String,
}

/// Serve one canned response per request, in order, then stop
fn serve(responses: Vec<(u16, String)>) -> (String, Receiver<Seen>) {
    let server = Server::http("127.0.0.1:0").expect("Failed to bind test server");
    let base_url = format!("http://{}", server.server_addr());
    let (tx, rx) = channel();

    thread::spawn(move || {
        for (status, body) in responses {
            let mut request = match server.recv_timeout(Duration::from_secs(10)) {
                Ok(Some(request)) => request,
                _ => return,
            };

            let mut received = String::new();
            let _ = request.as_reader().read_to_string(&mut received);
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_string());
            let _ = tx.send(Seen {
                method: request.method().to_string(),
                url: request.url().to_string(),
                authorization,
                body: received,
            });

            let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(content_type);
            let _ = request.respond(response);
        }
    });

    (base_url, rx)
}

fn gateway(base_url: &str) -> HttpZoneGateway {
    let config = ClientConfig {
        host: base_url.to_string(),
        auth_header: Some(AUTH.to_string()),
        request_timeout_secs: 5,
        ..ClientConfig::default()
    };
    HttpZoneGateway::new(&config).expect("Failed to build gateway")
}

fn fast_options() -> SaveOptions {
    SaveOptions {
        poll: PollPolicy {
            interval: Duration::from_millis(10),
            max_polls: Some(5),
            ..PollPolicy::default()
        },
        ..SaveOptions::default()
    }
}

#[test]
fn test_fetch_zone() {
    let (base_url, seen) = serve(vec![(200, fixture("example.com.json"))]);

    let zone = gateway(&base_url).fetch_zone("example.com").unwrap();
    assert_eq!(zone.token(), "a184671d5307a388180fbf7f11dbdf46");
    assert_eq!(zone.record_set(RecordType::Ns).unwrap().len(), 2);

    let request = seen.recv().unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "/config-dns/v1/zones/example.com");
    assert_eq!(request.authorization.as_deref(), Some(AUTH));
}

#[test]
fn test_fetch_missing_zone() {
    let problem = r#"{"type": "https://problems.luna.akamaiapis.net/config-dns/v1/not-found", "title": "Not Found", "status": 404}"#;
    let (base_url, _seen) = serve(vec![(404, problem.to_string())]);

    match gateway(&base_url).fetch_zone("missing.example.com") {
        Err(ZoneError::ZoneNotFound { zone_name }) => assert_eq!(zone_name, "missing.example.com"),
        other => panic!("Expected ZoneNotFound, got {:?}", other),
    }
}

#[test]
fn test_fetch_server_error() {
    let problem = r#"{"title": "Internal Server Error", "detail": "backend unavailable", "status": 500}"#;
    let (base_url, _seen) = serve(vec![(500, problem.to_string())]);

    match gateway(&base_url).fetch_zone("example.com") {
        Err(ZoneError::Api { status, title, detail }) => {
            assert_eq!(status, 500);
            assert_eq!(title, "Internal Server Error");
            assert_eq!(detail, "backend unavailable");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[test]
fn test_fetch_invalid_json() {
    let (base_url, _seen) = serve(vec![(200, "{\"token\": ".to_string())]);
    assert!(matches!(
        gateway(&base_url).fetch_zone("example.com"),
        Err(ZoneError::Decode(_))
    ));
}

/// A 500 on submit fails the save and leaves the local zone as it was
#[test]
fn test_save_fails_on_server_error() {
    let (base_url, seen) = serve(vec![(500, r#"{"title": "Internal Server Error"}"#.to_string())]);

    let mut zone: Zone = serde_json::from_str(&fixture("example.com.json")).unwrap();
    let mut www = DnsRecord::new(RecordType::A);
    www.set_field("name", "www").unwrap();
    www.set_field("target", "5.6.7.8").unwrap();
    zone.set_record(www);
    let snapshot = zone.clone();

    match zone.save(&gateway(&base_url), &fast_options()) {
        Err(ZoneError::FailedToSave { zone_name, detail }) => {
            assert_eq!(zone_name, "example.com");
            assert!(detail.contains("500"));
        }
        other => panic!("Expected FailedToSave, got {:?}", other),
    }
    assert_eq!(zone, snapshot);

    let request = seen.recv().unwrap();
    assert_eq!(request.method, "POST");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["zone"]["a"][0]["target"], "5.6.7.8");
}

#[test]
fn test_save_round_trip() {
    let (base_url, seen) = serve(vec![
        (200, String::new()),
        (200, fixture("example.com.json")),
        (200, fixture("updated.example.com.json")),
    ]);

    let mut zone: Zone = serde_json::from_str(&fixture("example.com.json")).unwrap();
    let report = zone.save(&gateway(&base_url), &fast_options()).unwrap();

    assert_eq!(report.polls, 2);
    assert_eq!(zone.token(), "b7f0e3c25a6d4e11a9c2d1f1b8a4e3d2");

    let methods: Vec<String> = seen.iter().take(3).map(|request| request.method).collect();
    assert_eq!(methods, vec!["POST", "GET", "GET"]);
}
