//! Save protocol tests against scripted gateways

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use configdns::{
    save, CancelSignal, DnsRecord, PollPolicy, RecordType, SaveOptions, Zone, ZoneError, ZoneGateway,
    ZoneResult,
};

fn load_fixture(name: &str) -> Zone {
    let path = format!("{}/tests/zone_files/{}", env!("CARGO_MANIFEST_DIR"), name);
    let contents = std::fs::read_to_string(&path).expect("Failed to read fixture");
    serde_json::from_str(&contents).expect("Failed to decode fixture")
}

fn fast_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(5),
        ..PollPolicy::default()
    }
}

/// Gateway replaying canned fetch results and recording submissions
struct ScriptedGateway {
    submit_result: Mutex<Option<ZoneError>>,
    fetches: Mutex<VecDeque<ZoneResult<Zone>>>,
    /// Returned once the script is exhausted
    steady_state: Option<Zone>,
    submitted: Mutex<Vec<serde_json::Value>>,
    fetch_count: AtomicUsize,
}

impl ScriptedGateway {
    fn new(fetches: Vec<ZoneResult<Zone>>) -> Self {
        Self {
            submit_result: Mutex::new(None),
            fetches: Mutex::new(fetches.into_iter().collect()),
            steady_state: None,
            submitted: Mutex::new(Vec::new()),
            fetch_count: AtomicUsize::new(0),
        }
    }

    fn unchanging(zone: Zone) -> Self {
        let mut gateway = Self::new(Vec::new());
        gateway.steady_state = Some(zone);
        gateway
    }

    fn failing_submit(error: ZoneError) -> Self {
        let gateway = Self::new(Vec::new());
        *gateway.submit_result.lock() = Some(error);
        gateway
    }

    fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl ZoneGateway for ScriptedGateway {
    fn fetch_zone(&self, name: &str) -> ZoneResult<Zone> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.fetches.lock().pop_front() {
            return next;
        }
        match &self.steady_state {
            Some(zone) => Ok(zone.clone()),
            None => Err(ZoneError::ZoneNotFound {
                zone_name: name.to_string(),
            }),
        }
    }

    fn submit_zone(&self, zone: &Zone) -> ZoneResult<()> {
        if let Some(error) = self.submit_result.lock().take() {
            return Err(error);
        }
        self.submitted.lock().push(serde_json::to_value(zone).unwrap());
        Ok(())
    }
}

fn www(target: &str) -> DnsRecord {
    let mut record = DnsRecord::new(RecordType::A);
    record.set_field("name", "www").unwrap();
    record.set_field("target", target).unwrap();
    record
}

/// The zone is replaced by the first fetched zone whose token changed
#[test]
fn test_save_replaces_zone_on_token_change() {
    let original = load_fixture("example.com.json");
    let updated = load_fixture("updated.example.com.json");
    let gateway = ScriptedGateway::new(vec![Ok(original.clone()), Ok(original.clone()), Ok(updated.clone())]);

    let mut zone = original.clone();
    zone.set_record(www("5.6.7.8"));

    let options = SaveOptions {
        poll: fast_policy(),
        ..SaveOptions::default()
    };
    let report = save(&mut zone, &gateway, &options).unwrap();

    assert_eq!(report.polls, 3);
    assert_eq!(report.previous_token, "a184671d5307a388180fbf7f11dbdf46");
    assert_eq!(zone.token(), "b7f0e3c25a6d4e11a9c2d1f1b8a4e3d2");
    assert_eq!(zone.record_count(), updated.record_count());
    assert_eq!(zone.soa().unwrap().serial(), 1271354825);

    let submitted = gateway.submitted.lock();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0]["token"], "a184671d5307a388180fbf7f11dbdf46");
    assert_eq!(submitted[0]["zone"]["a"][0]["target"], "5.6.7.8");
}

/// The submitted SOA carries a fresh serial; the local zone is not touched
/// until the API reports the new version
#[test]
fn test_save_advances_submitted_serial() {
    let original = load_fixture("example.com.json");
    let gateway = ScriptedGateway::unchanging(original.clone());

    let mut zone = original.clone();
    let options = SaveOptions {
        poll: PollPolicy {
            max_polls: Some(1),
            ..fast_policy()
        },
        ..SaveOptions::default()
    };
    let before = chrono::Utc::now().timestamp();
    assert!(matches!(
        save(&mut zone, &gateway, &options),
        Err(ZoneError::SaveTimedOut { .. })
    ));

    let submitted = gateway.submitted.lock();
    let serial = submitted[0]["zone"]["soa"]["serial"].as_i64().unwrap();
    assert!(serial >= before);
    assert!(serial > 1271354824);
    assert_eq!(zone.soa().unwrap().serial(), 1271354824);
    assert_eq!(zone, original);
}

#[test]
fn test_save_can_keep_serial() {
    let original = load_fixture("example.com.json");
    let gateway = ScriptedGateway::new(vec![Ok(load_fixture("updated.example.com.json"))]);

    let mut zone = original;
    let options = SaveOptions {
        poll: fast_policy(),
        bump_serial: false,
        ..SaveOptions::default()
    };
    save(&mut zone, &gateway, &options).unwrap();

    let submitted = gateway.submitted.lock();
    assert_eq!(submitted[0]["zone"]["soa"]["serial"].as_i64(), Some(1271354824));
}

/// A zone without an SOA is submitted as it is
#[test]
fn test_save_without_soa() {
    let gateway = ScriptedGateway::new(vec![Ok(load_fixture("updated.example.com.json"))]);

    let mut zone = Zone::new("example.com");
    zone.add_record(www("5.6.7.8")).unwrap();
    zone.save(&gateway, &SaveOptions::default()).unwrap();

    let submitted = gateway.submitted.lock();
    assert!(submitted[0]["zone"].get("soa").is_none());
}

#[test]
fn test_new_zone_save() {
    let updated = load_fixture("updated.example.com.json");
    let gateway = ScriptedGateway::new(vec![Ok(updated)]);

    let mut zone = Zone::new("example.com");
    zone.add_record(www("5.6.7.8")).unwrap();
    let report = zone.save(&gateway, &SaveOptions::default()).unwrap();

    assert_eq!(report.previous_token, "new");
    assert_eq!(report.polls, 1);
    assert!(!zone.is_new());
}

/// A refused submission never polls and leaves the local zone untouched
#[test]
fn test_failed_submit_leaves_zone_unchanged() {
    let gateway = ScriptedGateway::failing_submit(ZoneError::FailedToSave {
        zone_name: "example.com".to_string(),
        detail: "HTTP 500".to_string(),
    });

    let mut zone = load_fixture("example.com.json");
    zone.set_record(www("5.6.7.8"));
    let snapshot = zone.clone();

    match zone.save(&gateway, &SaveOptions::default()) {
        Err(ZoneError::FailedToSave { zone_name, .. }) => assert_eq!(zone_name, "example.com"),
        other => panic!("Expected FailedToSave, got {:?}", other),
    }
    assert_eq!(zone, snapshot);
    assert_eq!(gateway.fetch_count(), 0);
}

#[test]
fn test_fetch_error_while_polling_propagates() {
    let original = load_fixture("example.com.json");
    let gateway = ScriptedGateway::new(vec![
        Ok(original.clone()),
        Err(ZoneError::Api {
            status: 503,
            title: "Service Unavailable".to_string(),
            detail: String::new(),
        }),
    ]);

    let mut zone = original.clone();
    let options = SaveOptions {
        poll: fast_policy(),
        ..SaveOptions::default()
    };
    match save(&mut zone, &gateway, &options) {
        Err(ZoneError::Api { status, .. }) => assert_eq!(status, 503),
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(zone, original);
}

#[test]
fn test_save_gives_up_after_max_polls() {
    let original = load_fixture("example.com.json");
    let gateway = ScriptedGateway::unchanging(original.clone());

    let mut zone = original;
    let options = SaveOptions {
        poll: PollPolicy {
            max_polls: Some(4),
            ..fast_policy()
        },
        ..SaveOptions::default()
    };

    match save(&mut zone, &gateway, &options) {
        Err(ZoneError::SaveTimedOut { zone_name, polls, .. }) => {
            assert_eq!(zone_name, "example.com");
            assert_eq!(polls, 4);
        }
        other => panic!("Expected SaveTimedOut, got {:?}", other),
    }
    assert_eq!(gateway.fetch_count(), 4);
}

#[test]
fn test_save_gives_up_after_timeout() {
    let original = load_fixture("example.com.json");
    let gateway = ScriptedGateway::unchanging(original.clone());

    let mut zone = original;
    let options = SaveOptions {
        poll: PollPolicy {
            interval: Duration::from_millis(20),
            timeout: Some(Duration::from_millis(100)),
            ..PollPolicy::default()
        },
        ..SaveOptions::default()
    };

    let start = Instant::now();
    match save(&mut zone, &gateway, &options) {
        Err(ZoneError::SaveTimedOut { elapsed, polls, .. }) => {
            assert!(elapsed >= Duration::from_millis(100));
            assert!(polls >= 2);
        }
        other => panic!("Expected SaveTimedOut, got {:?}", other),
    }
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_cancel_interrupts_polling() {
    let original = load_fixture("example.com.json");
    let gateway = ScriptedGateway::unchanging(original.clone());
    let cancel = CancelSignal::new();

    let remote = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.cancel();
    });

    let mut zone = original.clone();
    let options = SaveOptions {
        poll: PollPolicy {
            interval: Duration::from_secs(60),
            timeout: None,
            ..PollPolicy::default()
        },
        ..SaveOptions::default()
    }
    .with_cancel(cancel);

    let start = Instant::now();
    match save(&mut zone, &gateway, &options) {
        Err(ZoneError::SaveCancelled { polls, .. }) => assert_eq!(polls, 1),
        other => panic!("Expected SaveCancelled, got {:?}", other),
    }
    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(zone, original);
    canceller.join().unwrap();
}

#[test]
fn test_cancelled_before_submit() {
    let gateway = ScriptedGateway::unchanging(load_fixture("example.com.json"));
    let cancel = CancelSignal::new();
    cancel.cancel();

    let mut zone = Zone::new("example.com");
    let options = SaveOptions::default().with_cancel(cancel);
    assert!(matches!(
        save(&mut zone, &gateway, &options),
        Err(ZoneError::SaveCancelled { polls: 0, .. })
    ));
    assert!(gateway.submitted.lock().is_empty());
}
