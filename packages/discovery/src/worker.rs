//! The generic connector engine.
//!
//! A [`Connector`] bridges inbound work requests to one external data
//! source and republishes normalized findings onto the bus. Many connector
//! instances run concurrently, one tokio task each, fully independent;
//! within one instance request handling is strictly sequential, so a slow
//! fetch stalls only that connector's queue.
//!
//! All per-request failures (fetch errors, reported failures, malformed
//! payloads) are contained inside the loop: logged, swallowed, and the loop
//! moves on. There is no retry or backoff at this layer; re-issuing work is
//! the orchestrator's decision.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bus::FindingBus;
use crate::error::{ExtractError, WorkerError};
use crate::fetch::Fetcher;
use crate::scope::Scope;
use crate::sources::DataSource;
use crate::types::{AddrFinding, NameFinding, WorkRequest};

/// Default capacity of the inbound request queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// One connector instance: a data source wired to its scope, fetcher, and
/// bus collaborators.
///
/// Constructed idle; [`start`](Connector::start) spawns the processing loop
/// exactly once, [`stop`](Connector::stop) signals it to exit after the
/// in-flight request.
pub struct Connector<S, F, B, C> {
    source: Arc<S>,
    fetcher: Arc<F>,
    bus: Arc<B>,
    scope: Arc<C>,
    requests: Option<mpsc::Receiver<WorkRequest>>,
    cancel: CancellationToken,
    active: Arc<AtomicBool>,
}

impl<S, F, B, C> Connector<S, F, B, C>
where
    S: DataSource,
    F: Fetcher,
    B: FindingBus,
    C: Scope,
{
    /// Create a connector together with the sender the orchestrator uses to
    /// submit work, with the default queue capacity.
    pub fn new(source: S, fetcher: F, bus: B, scope: C) -> (Self, mpsc::Sender<WorkRequest>) {
        Self::with_queue_capacity(source, fetcher, bus, scope, DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a connector with an explicit inbound queue capacity.
    pub fn with_queue_capacity(
        source: S,
        fetcher: F,
        bus: B,
        scope: C,
        capacity: usize,
    ) -> (Self, mpsc::Sender<WorkRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        let connector = Self {
            source: Arc::new(source),
            fetcher: Arc::new(fetcher),
            bus: Arc::new(bus),
            scope: Arc::new(scope),
            requests: Some(rx),
            cancel: CancellationToken::new(),
            active: Arc::new(AtomicBool::new(false)),
        };
        (connector, tx)
    }

    /// Display name of the underlying source.
    pub fn name(&self) -> &str {
        &self.source.identity().name
    }

    /// Whether the source has returned at least one parseable response.
    ///
    /// Monotonic: set on the first successful parse, never reset. For
    /// observability only.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Spawn the processing loop.
    ///
    /// Transitions the connector to running exactly once; a second call
    /// returns [`WorkerError::AlreadyStarted`]. The returned handle
    /// completes when the loop has exited.
    pub fn start(&mut self) -> Result<JoinHandle<()>, WorkerError> {
        let requests = self
            .requests
            .take()
            .ok_or_else(|| WorkerError::AlreadyStarted {
                source_name: self.source.identity().name.clone(),
            })?;

        let engine = Engine {
            source: Arc::clone(&self.source),
            fetcher: Arc::clone(&self.fetcher),
            bus: Arc::clone(&self.bus),
            scope: Arc::clone(&self.scope),
            active: Arc::clone(&self.active),
        };
        let cancel = self.cancel.clone();

        Ok(tokio::spawn(async move {
            engine.run(requests, cancel).await;
        }))
    }

    /// Signal the processing loop to exit after the in-flight request.
    ///
    /// Idempotent; repeated signals are no-ops. Cooperative only: an
    /// in-flight fetch is not interrupted.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// The spawned half of a connector: everything the loop needs to own.
struct Engine<S, F, B, C> {
    source: Arc<S>,
    fetcher: Arc<F>,
    bus: Arc<B>,
    scope: Arc<C>,
    active: Arc<AtomicBool>,
}

impl<S, F, B, C> Engine<S, F, B, C>
where
    S: DataSource,
    F: Fetcher,
    B: FindingBus,
    C: Scope,
{
    /// Processing loop: waits on the stop signal or the next request,
    /// whichever comes first, and handles requests one at a time.
    async fn run(self, mut requests: mpsc::Receiver<WorkRequest>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                // Once stop is signaled, no new requests are accepted.
                biased;

                _ = cancel.cancelled() => {
                    debug!(source = %self.source.identity(), "stop signal received");
                    break;
                }
                request = requests.recv() => {
                    let Some(request) = request else {
                        // Orchestrator dropped its sender: implicit stop.
                        debug!(source = %self.source.identity(), "request channel closed");
                        break;
                    };

                    // Scope gate before any I/O; out-of-scope work is
                    // dropped silently.
                    if !self.scope.is_in_scope(&request.domain) {
                        continue;
                    }

                    self.execute_query(&request.domain).await;
                }
            }
        }
    }

    /// One full query: fetch, extract, publish.
    async fn execute_query(&self, domain: &str) {
        let identity = self.source.identity();
        let url = self.source.query_url(domain);

        let payload = match self.fetcher.fetch(&url, &self.source.headers()).await {
            Ok(payload) => payload,
            Err(e) => {
                // The domain is abandoned for this instance; a future
                // request drives any re-attempt.
                warn!(source = %identity, url = %url, error = %e, "fetch failed");
                return;
            }
        };

        let findings = match self.source.extract(&payload, domain) {
            Ok(findings) => findings,
            Err(ExtractError::ReportedFailure { code }) => {
                debug!(source = %identity, url = %url, code = %code, "source reported no data");
                return;
            }
            Err(ExtractError::Malformed(e)) => {
                debug!(source = %identity, url = %url, error = %e, "malformed payload");
                return;
            }
        };

        self.active.store(true, Ordering::SeqCst);

        // Sources may return hosts outside the queried domain; the scope
        // regex is the shared defense. Names go out before addresses, in
        // payload order within each kind.
        let matcher = self.scope.name_matcher(domain);
        for name in findings.names {
            let name = name.to_lowercase();
            let in_scope = matcher.as_ref().map(|re| re.is_match(&name)).unwrap_or(false);
            if !in_scope {
                continue;
            }
            self.bus
                .publish_name(NameFinding::new(name, domain, identity))
                .await;
        }

        for address in findings.addresses {
            self.bus
                .publish_addr(AddrFinding::new(address, domain, identity))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ThreatCrowd;
    use crate::testing::{MockFetcher, RecordingBus, StaticScope};

    #[tokio::test]
    async fn test_start_twice_is_an_error() {
        let (mut connector, _tx) = Connector::new(
            ThreatCrowd::new(),
            MockFetcher::new(),
            RecordingBus::new(),
            StaticScope::new().with_domain("example.com"),
        );

        let handle = connector.start().unwrap();
        let err = connector.start().unwrap_err();
        assert!(matches!(err, WorkerError::AlreadyStarted { source_name } if source_name == "ThreatCrowd"));

        connector.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_before_start_exits_loop_immediately() {
        let (mut connector, _tx) = Connector::new(
            ThreatCrowd::new(),
            MockFetcher::new(),
            RecordingBus::new(),
            StaticScope::new(),
        );

        connector.stop();
        let handle = connector.start().unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_connector_name_matches_source() {
        let (connector, _tx) = Connector::new(
            ThreatCrowd::new(),
            MockFetcher::new(),
            RecordingBus::new(),
            StaticScope::new(),
        );
        assert_eq!(connector.name(), "ThreatCrowd");
        assert!(!connector.is_active());
    }
}
