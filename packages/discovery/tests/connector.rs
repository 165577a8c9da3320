//! Integration tests for the connector engine.
//!
//! These tests run the full lifecycle: build a connector over mock
//! collaborators, feed it requests, and assert on what reaches the bus.
//! Dropping the request sender closes the intake channel, which lets each
//! test wait for the loop to drain and exit deterministically.

use tokio::sync::mpsc;

use discovery::testing::{MockFetcher, Published, RecordingBus, StaticScope};
use discovery::{ChannelBus, Connector, SourceKind, ThreatCrowd, WorkRequest, WorkerError};

const REPORT_URL: &str = "https://www.threatcrowd.org/searchApi/v2/domain/report/?domain=example.com";

fn scope() -> StaticScope {
    StaticScope::new().with_domain("example.com")
}

fn success_payload() -> &'static str {
    r#"{
        "response_code": "1",
        "subdomains": ["Sub.example.com", "other.org"],
        "resolutions": [{"ip_address": "1.2.3.4"}]
    }"#
}

#[tokio::test]
async fn success_scenario_publishes_scoped_findings() {
    let fetcher = MockFetcher::new().with_payload(REPORT_URL, success_payload());
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher.clone(), bus.clone(), scope());
    let handle = connector.start().unwrap();

    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    // Exactly one name: lowercased, scope-matched; "other.org" dropped.
    let names = bus.names();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].name, "sub.example.com");
    assert_eq!(names[0].domain, "example.com");
    assert_eq!(names[0].tag, SourceKind::Api);
    assert_eq!(names[0].source, "ThreatCrowd");

    let addrs = bus.addrs();
    assert_eq!(addrs.len(), 1);
    assert_eq!(addrs[0].address, "1.2.3.4");
    assert_eq!(addrs[0].domain, "example.com");
    assert_eq!(addrs[0].source, "ThreatCrowd");

    assert_eq!(fetcher.call_count(), 1);
    assert!(connector.is_active());
}

#[tokio::test]
async fn out_of_scope_request_is_dropped_before_any_fetch() {
    let fetcher = MockFetcher::new();
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher.clone(), bus.clone(), scope());
    let handle = connector.start().unwrap();

    tx.send(WorkRequest::new("unrelated.net")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    assert_eq!(fetcher.call_count(), 0);
    assert!(bus.published().is_empty());
}

#[tokio::test]
async fn reported_failure_yields_nothing_and_loop_keeps_running() {
    let failed_url = "https://www.threatcrowd.org/searchApi/v2/domain/report/?domain=empty.example.com";
    let fetcher = MockFetcher::new()
        .with_payload(failed_url, r#"{"response_code": "0"}"#)
        .with_payload(REPORT_URL, success_payload());
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher.clone(), bus.clone(), scope());
    let handle = connector.start().unwrap();

    // The failing request must not stop the loop from serving the next one.
    tx.send(WorkRequest::new("empty.example.com")).await.unwrap();
    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    let names = bus.names();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].domain, "example.com");
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn transport_error_yields_nothing_and_loop_keeps_running() {
    let broken_url = "https://www.threatcrowd.org/searchApi/v2/domain/report/?domain=down.example.com";
    let fetcher = MockFetcher::new()
        .with_error(broken_url, "connection refused")
        .with_payload(REPORT_URL, success_payload());
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher.clone(), bus.clone(), scope());
    let handle = connector.start().unwrap();

    tx.send(WorkRequest::new("down.example.com")).await.unwrap();
    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    // One fetch per accepted request, no retry of the failed one.
    assert_eq!(fetcher.call_count(), 2);
    assert_eq!(bus.names().len(), 1);
    assert_eq!(bus.addrs().len(), 1);
}

#[tokio::test]
async fn malformed_payload_is_swallowed() {
    let fetcher = MockFetcher::new().with_payload(REPORT_URL, "<html>rate limited</html>");
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher.clone(), bus.clone(), scope());
    let handle = connector.start().unwrap();

    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    assert!(bus.published().is_empty());
    assert!(!connector.is_active());
}

#[tokio::test]
async fn names_are_published_before_addresses_in_payload_order() {
    let payload = r#"{
        "response_code": "1",
        "subdomains": ["b.example.com", "a.example.com"],
        "resolutions": [{"ip_address": "1.1.1.1"}, {"ip_address": "2.2.2.2"}]
    }"#;
    let fetcher = MockFetcher::new().with_payload(REPORT_URL, payload);
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher, bus.clone(), scope());
    let handle = connector.start().unwrap();

    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    let published = bus.published();
    assert_eq!(published.len(), 4);
    assert!(matches!(&published[0], Published::Name(f) if f.name == "b.example.com"));
    assert!(matches!(&published[1], Published::Name(f) if f.name == "a.example.com"));
    assert!(matches!(&published[2], Published::Addr(f) if f.address == "1.1.1.1"));
    assert!(matches!(&published[3], Published::Addr(f) if f.address == "2.2.2.2"));
}

#[tokio::test]
async fn exactly_one_fetch_per_accepted_request() {
    let fetcher = MockFetcher::new().with_payload(REPORT_URL, success_payload());
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher.clone(), bus, scope());
    let handle = connector.start().unwrap();

    tx.send(WorkRequest::new("example.com")).await.unwrap();
    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    assert_eq!(fetcher.call_count(), 2);
    assert_eq!(
        fetcher.calls(),
        vec![REPORT_URL.to_string(), REPORT_URL.to_string()]
    );
}

#[tokio::test]
async fn double_start_is_an_error_but_instance_survives() {
    let fetcher = MockFetcher::new().with_payload(REPORT_URL, success_payload());
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher, bus.clone(), scope());
    let handle = connector.start().unwrap();

    assert!(matches!(
        connector.start(),
        Err(WorkerError::AlreadyStarted { .. })
    ));

    // The running loop is unaffected by the failed second start.
    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();
    assert_eq!(bus.names().len(), 1);
}

#[tokio::test]
async fn stop_is_idempotent_and_terminates_the_loop() {
    let (mut connector, tx) = Connector::new(
        ThreatCrowd::new(),
        MockFetcher::new(),
        RecordingBus::new(),
        scope(),
    );
    let handle = connector.start().unwrap();

    connector.stop();
    connector.stop();
    handle.await.unwrap();

    // Stopping again after the loop exited is still a no-op.
    connector.stop();

    // The loop is gone: the intake channel has no receiver any more.
    assert!(tx.send(WorkRequest::new("example.com")).await.is_err());
}

#[tokio::test]
async fn channel_bus_delivers_findings_downstream() {
    let (name_tx, mut name_rx) = mpsc::channel(16);
    let (addr_tx, mut addr_rx) = mpsc::channel(16);
    let bus = ChannelBus::new(name_tx, addr_tx);

    let fetcher = MockFetcher::new().with_payload(REPORT_URL, success_payload());
    let (mut connector, tx) = Connector::new(ThreatCrowd::new(), fetcher, bus, scope());
    let handle = connector.start().unwrap();

    tx.send(WorkRequest::new("example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    let name = name_rx.recv().await.unwrap();
    assert_eq!(name.name, "sub.example.com");
    assert_eq!(name.source, "ThreatCrowd");

    let addr = addr_rx.recv().await.unwrap();
    assert_eq!(addr.address, "1.2.3.4");
}

#[tokio::test]
async fn active_flag_is_monotonic_across_requests() {
    let failed_url = "https://www.threatcrowd.org/searchApi/v2/domain/report/?domain=empty.example.com";
    let fetcher = MockFetcher::new()
        .with_payload(REPORT_URL, success_payload())
        .with_payload(failed_url, r#"{"response_code": "0"}"#);
    let bus = RecordingBus::new();

    let (mut connector, tx) =
        Connector::new(ThreatCrowd::new(), fetcher, bus, scope());
    assert!(!connector.is_active());

    let handle = connector.start().unwrap();
    tx.send(WorkRequest::new("example.com")).await.unwrap();
    tx.send(WorkRequest::new("empty.example.com")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    // Set by the successful parse, not reset by the later failure.
    assert!(connector.is_active());
}
