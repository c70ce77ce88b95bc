//! Scripted collaborators for strategy tests.
//!
//! Every mock is cheap to clone and shares its state between clones, so a
//! test keeps one clone for assertions and hands the other to the builder.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use fetchbox::{
    Collaborators, ContentStore, Event, FallbackProvider, FetchError, MatchingContext,
    OriginFetcher, ReadOptions, Request, Response, Rule, StoreError, StoreResult, Strategies,
    TraceSink,
};
use http::{StatusCode, Uri};
use serde_json::Value;
use smol_str::SmolStr;

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// In-memory content store keyed by request path.
#[derive(Clone, Default)]
pub struct MockStore {
    entries: Arc<DashMap<String, Response>>,
    read_delay: Duration,
    prime_delay: Duration,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_primes: Arc<AtomicBool>,
    resolves: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    primes: Arc<Mutex<Vec<Vec<SmolStr>>>>,
    read_options: Arc<Mutex<Vec<ReadOptions>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, path: &str, response: Response) -> Self {
        self.entries.insert(path.to_string(), response);
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn with_prime_delay(mut self, delay: Duration) -> Self {
        self.prime_delay = delay;
        self
    }

    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_primes(self) -> Self {
        self.fail_primes.store(true, Ordering::SeqCst);
        self
    }

    pub fn entry(&self, path: &str) -> Option<Response> {
        self.entries.get(path).map(|r| r.clone())
    }

    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn primed(&self) -> Vec<Vec<SmolStr>> {
        self.primes.lock().unwrap().clone()
    }

    pub fn read_options(&self) -> Vec<ReadOptions> {
        self.read_options.lock().unwrap().clone()
    }
}

fn store_failure(message: &str) -> StoreError {
    StoreError::internal(std::io::Error::other(message.to_string()))
}

#[async_trait]
impl ContentStore for MockStore {
    async fn resolve(
        &self,
        _rule: &Rule,
        request: &Request,
        _event: &Event,
        _matching: &MatchingContext,
    ) -> Response {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        pause(self.read_delay).await;
        self.entry(request.path()).unwrap_or_else(|| {
            Response::new(StatusCode::NOT_FOUND).with_reason("not in store")
        })
    }

    async fn read(
        &self,
        _rule: &Rule,
        request: &Request,
        _event: &Event,
        _matching: &MatchingContext,
        options: ReadOptions,
    ) -> StoreResult<Option<Response>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.read_options.lock().unwrap().push(options);
        pause(self.read_delay).await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(store_failure("store unavailable"));
        }
        Ok(self.entry(request.path()))
    }

    async fn write(&self, _rule: &Rule, request: &Request, response: Response) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(store_failure("disk full"));
        }
        self.entries.insert(request.path().to_string(), response);
        Ok(())
    }

    async fn prime_all(&self, bundle: &[SmolStr]) -> StoreResult<()> {
        self.primes.lock().unwrap().push(bundle.to_vec());
        pause(self.prime_delay).await;
        if self.fail_primes.load(Ordering::SeqCst) {
            return Err(store_failure("bundle entry missing"));
        }
        Ok(())
    }
}

#[derive(Clone)]
enum Reply {
    Respond(Response),
    Reject(String),
}

/// Origin answering every fetch with the same scripted outcome.
#[derive(Clone)]
pub struct MockOrigin {
    reply: Reply,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockOrigin {
    pub fn respond(response: Response) -> Self {
        Self {
            reply: Reply::Respond(response),
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self::respond(Response::new(status))
    }

    pub fn reject(message: &str) -> Self {
        Self {
            reply: Reply::Reject(message.to_string()),
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OriginFetcher for MockOrigin {
    async fn fetch(
        &self,
        _rule: &Rule,
        _request: Request,
        _event: &Event,
        _matching: &MatchingContext,
    ) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Reject(message) => Err(FetchError::transport(std::io::Error::other(
                message.clone(),
            ))),
        }
    }
}

/// Trace sink keeping every step in order.
#[derive(Clone, Default)]
pub struct RecordingTrace {
    steps: Arc<Mutex<Vec<(String, Option<Value>)>>>,
}

impl RecordingTrace {
    pub fn messages(&self) -> Vec<String> {
        self.steps
            .lock()
            .unwrap()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }

    pub fn count(&self, message: &str) -> usize {
        self.steps
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == message)
            .count()
    }

    pub fn data(&self, message: &str) -> Option<Value> {
        self.steps
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| m == message)
            .and_then(|(_, data)| data.clone())
    }
}

impl TraceSink for RecordingTrace {
    fn step(&self, _event: &Event, message: &str, data: Option<Value>) {
        self.steps
            .lock()
            .unwrap()
            .push((message.to_string(), data));
    }
}

/// Fallback provider recording what it was asked to substitute.
#[derive(Clone, Default)]
pub struct CountingFallback {
    calls: Arc<Mutex<Vec<(StatusCode, String)>>>,
}

impl CountingFallback {
    pub fn calls(&self) -> Vec<(StatusCode, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl FallbackProvider for CountingFallback {
    fn substitute(&self, failing: &Response, path: &str, _event: &Event) -> Response {
        self.calls
            .lock()
            .unwrap()
            .push((failing.status, path.to_string()));
        Response::new(failing.status)
            .with_reason("fallback")
            .with_body(format!("fallback page for {path}"))
    }
}

/// Collaborators and the strategies built over them.
pub struct Harness {
    pub strategies: Strategies,
    pub trace: RecordingTrace,
    pub fallback: CountingFallback,
}

impl Harness {
    pub fn new(store: MockStore, origin: MockOrigin) -> Self {
        Self::with_builder(store, origin, |builder| builder)
    }

    pub fn with_builder(
        store: MockStore,
        origin: MockOrigin,
        configure: impl FnOnce(fetchbox::CollaboratorsBuilder) -> fetchbox::CollaboratorsBuilder,
    ) -> Self {
        let trace = RecordingTrace::default();
        let fallback = CountingFallback::default();
        let builder = Collaborators::builder()
            .store(store)
            .origin(origin)
            .fallback(fallback.clone())
            .trace(trace.clone());
        let collaborators = configure(builder).build().unwrap();
        Self {
            strategies: Strategies::new(collaborators),
            trace,
            fallback,
        }
    }

    pub fn collaborators(&self) -> &Collaborators {
        self.strategies.collaborators()
    }

    /// Waits until every background task, including nested ones, finished.
    pub async fn settle(&self) {
        self.collaborators().offload().wait_all().await;
    }
}

pub fn request(path: &str) -> (Request, Event) {
    let uri: Uri = format!("https://example.com{path}").parse().unwrap();
    let request = Request::get(uri);
    let event = Event::new(request.clone());
    (request, event)
}

pub fn matching() -> MatchingContext {
    MatchingContext::new(serde_json::json!({ "rule": "test" }))
}
