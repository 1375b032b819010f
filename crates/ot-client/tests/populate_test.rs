//! Populate behaviour against an in-memory transport: ordering, events,
//! short-circuit on error, key barriers, the concurrency cap and
//! instance isolation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ot_client::{
    ClientConfig, ClientError, ConfigOverride, DateValue, Document, PopulateEvent, TidyOverride,
    Transport, TrialsClient,
};
use serde_json::{json, Value};

/// Serves canned bodies by URL and records what was fetched.
#[derive(Default)]
struct StubTransport {
    responses: HashMap<String, Value>,
    delay: Duration,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StubTransport {
    fn with(responses: &[(&str, Value)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    async fn get_json(&self, url: &str) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(url).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                url: url.to_string(),
                status: 404,
                body: String::new(),
            })
    }
}

fn client(stub: StubTransport) -> TrialsClient<StubTransport> {
    TrialsClient::with_transport(ClientConfig::default(), stub)
}

fn populate() -> ConfigOverride {
    ConfigOverride::default().with_populate(true)
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<PopulateEvent>) -> Vec<PopulateEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn populate_replaces_references_in_order() {
    let stub = StubTransport::with(&[
        ("U1", json!({"source_data": {"title": "one"}, "updated_at": "2016-10-05T12:00:00Z"})),
        ("U2", json!({"source_data": {"title": "two"}})),
    ]);
    let client = client(stub);
    let mut rx = client.subscribe();

    let doc = Document::from(json!({"id": "t1", "records": [{"url": "U1"}, {"url": "U2"}]}));
    let out = client.populate(doc, &populate()).await.unwrap();

    let records = out.get("records").and_then(Document::as_sequence).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].get("sourceData").and_then(|d| d.get("title")).and_then(Document::as_str),
        Some("one")
    );
    assert!(matches!(
        records[0].get("updatedAt"),
        Some(Document::Date(DateValue::Valid(_)))
    ));
    assert_eq!(
        records[1].get("sourceData").and_then(|d| d.get("title")).and_then(Document::as_str),
        Some("two")
    );

    let events = drain(&mut rx);
    let pre = events
        .iter()
        .filter(|e| matches!(e, PopulateEvent::PrePopulate { .. }))
        .count();
    let post: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PopulateEvent::PostPopulate { reference, resolved } => Some((reference, resolved)),
            _ => None,
        })
        .collect();
    assert_eq!(pre, 2);
    assert_eq!(post.len(), 2);
    for (reference, resolved) in post {
        assert!(reference.get("url").is_some());
        assert!(resolved.get("sourceData").is_some());
    }
}

#[tokio::test]
async fn remote_error_short_circuits_populate() {
    let stub = StubTransport::with(&[
        ("U1", json!({"source_data": {}})),
        ("U2", json!({"error": "record withdrawn"})),
        ("U3", json!({"source_data": {}})),
    ]);
    let client = client(stub);

    let doc = Document::from(json!({"records": [{"url": "U1"}, {"url": "U2"}, {"url": "U3"}]}));
    let err = client.populate(doc, &populate()).await.unwrap_err();

    match err {
        ClientError::Remote { url, message } => {
            assert_eq!(url, "U2");
            assert_eq!(message, "record withdrawn");
        }
        other => panic!("expected Remote, got: {other:?}"),
    }
}

fn fast_and_slow(slow_body: Value) -> StubTransport {
    let mut stub =
        StubTransport::with(&[("FAST", json!({"speed": "fast"})), ("SLOW", slow_body)]);
    stub.delays.insert("SLOW".into(), Duration::from_millis(200));
    stub
}

#[tokio::test]
async fn resolved_reference_is_announced_before_slow_sibling_completes() {
    let client = client(fast_and_slow(json!({"speed": "slow"})));
    let mut rx = client.subscribe();

    let doc = Document::from(json!({"records": [{"url": "SLOW"}, {"url": "FAST"}]}));
    let first_post = async {
        loop {
            if let PopulateEvent::PostPopulate { reference, .. } = rx.recv().await.unwrap() {
                return (reference, client.transport().completed());
            }
        }
    };
    let over = populate();
    let (out, (reference, completed_then)) =
        tokio::join!(client.populate(doc, &over), first_post);

    assert_eq!(reference.get("url").and_then(Document::as_str), Some("FAST"));
    assert_eq!(completed_then, vec!["FAST"]);

    let records = out.unwrap().get("records").and_then(Document::as_sequence).unwrap().clone();
    assert_eq!(records[0].get("speed").and_then(Document::as_str), Some("slow"));
    assert_eq!(records[1].get("speed").and_then(Document::as_str), Some("fast"));
}

#[tokio::test]
async fn resolved_siblings_are_announced_before_a_later_failure() {
    let client = client(fast_and_slow(json!({"error": "record withdrawn"})));
    let mut rx = client.subscribe();

    let doc = Document::from(json!({"records": [{"url": "SLOW"}, {"url": "FAST"}]}));
    let err = client.populate(doc, &populate()).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote { ref url, .. } if url == "SLOW"));

    let posted: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            PopulateEvent::PostPopulate { reference, .. } => Some(reference),
            _ => None,
        })
        .collect();
    assert_eq!(posted, vec![Document::from(json!({"url": "FAST"}))]);
}

#[tokio::test]
async fn transport_error_propagates() {
    let client = client(StubTransport::default());
    let doc = Document::from(json!({"records": [{"url": "missing"}]}));
    let err = client.populate(doc, &populate()).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn non_followable_elements_pass_through() {
    let stub = StubTransport::with(&[("U1", json!({"title": "one"}))]);
    let client = client(stub);
    let mut rx = client.subscribe();

    let doc = Document::from(json!({"records": [{"id": "inline"}, {"url": "U1"}, "plain"]}));
    let out = client.populate(doc, &populate()).await.unwrap();

    let records = out.get("records").and_then(Document::as_sequence).unwrap();
    assert_eq!(records[0], Document::from(json!({"id": "inline"})));
    assert_eq!(records[1], Document::from(json!({"title": "one"})));
    assert_eq!(records[2], Document::from(json!("plain")));
    assert_eq!(client.transport().calls(), vec!["U1"]);
    assert_eq!(drain(&mut rx).len(), 2);
}

#[tokio::test]
async fn missing_or_non_sequence_keys_are_skipped() {
    let client = client(StubTransport::default());

    let doc = Document::from(json!({"id": "t1"}));
    assert_eq!(client.populate(doc.clone(), &populate()).await.unwrap(), doc);

    let doc = Document::from(json!({"records": {"url": "U1"}}));
    assert_eq!(client.populate(doc.clone(), &populate()).await.unwrap(), doc);

    assert!(client.transport().calls().is_empty());
}

#[tokio::test]
async fn nested_references_are_populated_recursively() {
    let stub = StubTransport::with(&[
        ("U1", json!({"id": "r1", "records": [{"url": "U2"}]})),
        ("U2", json!({"id": "r2", "public_title": "leaf"})),
    ]);
    let client = client(stub);

    let doc = Document::from(json!({"records": [{"url": "U1"}]}));
    let out = client.tidy(doc, &populate()).await.unwrap();

    let inner = out.get("records").and_then(Document::as_sequence).unwrap()[0]
        .get("records")
        .and_then(Document::as_sequence)
        .unwrap()[0]
        .clone();
    assert_eq!(inner.get("publicTitle").and_then(Document::as_str), Some("leaf"));
    assert_eq!(client.transport().calls(), vec!["U1", "U2"]);
}

#[tokio::test]
async fn populate_keys_are_processed_in_order() {
    let mut stub = StubTransport::with(&[
        ("R1", json!({"kind": "record"})),
        ("R2", json!({"kind": "record"})),
        ("P1", json!({"kind": "publication"})),
    ]);
    stub.delay = Duration::from_millis(5);
    let client = client(stub);

    let over = ConfigOverride {
        tidy: TidyOverride {
            populate: Some(true),
            populate_keys: Some(vec!["publications".into(), "records".into()]),
            ..Default::default()
        },
        ..Default::default()
    };
    let doc = Document::from(json!({
        "records": [{"url": "R1"}, {"url": "R2"}],
        "publications": [{"url": "P1"}]
    }));
    client.populate(doc, &over).await.unwrap();

    let calls = client.transport().calls();
    assert_eq!(calls[0], "P1");
    let mut rest = calls[1..].to_vec();
    rest.sort();
    assert_eq!(rest, vec!["R1", "R2"]);
}

#[tokio::test]
async fn concurrency_is_capped() {
    let urls: Vec<String> = (0..6).map(|i| format!("U{i}")).collect();
    let responses: Vec<(&str, Value)> = urls.iter().map(|u| (u.as_str(), json!({"ok": true}))).collect();
    let mut stub = StubTransport::with(&responses);
    stub.delay = Duration::from_millis(10);
    let client = client(stub);

    let references: Vec<Value> = urls.iter().map(|u| json!({"url": u})).collect();
    let doc = Document::from(json!({"records": references}));
    let over = ConfigOverride {
        max_concurrency: Some(2),
        ..populate()
    };
    let out = client.populate(doc, &over).await.unwrap();

    assert_eq!(out.get("records").and_then(Document::as_sequence).unwrap().len(), 6);
    assert_eq!(client.transport().peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn tidy_without_populate_does_no_io() {
    let client = client(StubTransport::default());
    let doc = Document::from(json!({"brief_summary": "s", "records": [{"url": "U1"}]}));

    let out = client.tidy(doc.clone(), &ConfigOverride::default()).await.unwrap();

    assert_eq!(out, client.normalize(doc, &ConfigOverride::default()));
    assert_eq!(out.get("briefSummary").and_then(Document::as_str), Some("s"));
    assert!(client.transport().calls().is_empty());
}

#[tokio::test]
async fn new_instance_is_isolated() {
    let mut client = client(StubTransport::default());
    client.config_mut().page_limit = 99;
    let _rx = client.subscribe();
    assert_eq!(client.subscriber_count(), 1);

    let fresh = client.new_instance();

    assert_eq!(fresh.config().page_limit, 10);
    assert_eq!(fresh.subscriber_count(), 0);
    assert_eq!(client.config().page_limit, 99);
}
