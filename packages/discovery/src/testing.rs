//! Testing utilities including mock collaborators.
//!
//! Useful for testing applications that embed connectors without making
//! real network calls or standing up a bus transport.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::bus::FindingBus;
use crate::error::{FetchError, FetchResult};
use crate::fetch::Fetcher;
use crate::scope::Scope;
use crate::types::{AddrFinding, NameFinding};

/// Scope over a fixed set of root domains.
///
/// A domain is in scope when it equals a configured root or is a subdomain
/// of one. The name matcher is an anchored subdomain regex for the queried
/// domain.
#[derive(Debug, Default, Clone)]
pub struct StaticScope {
    roots: Vec<String>,
}

impl StaticScope {
    /// Create an empty scope (nothing is in scope).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root domain to the scope (builder pattern).
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.roots.push(domain.into().to_lowercase());
        self
    }
}

impl Scope for StaticScope {
    fn is_in_scope(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        self.roots
            .iter()
            .any(|root| domain == *root || domain.ends_with(&format!(".{}", root)))
    }

    fn name_matcher(&self, domain: &str) -> Option<Regex> {
        if !self.is_in_scope(domain) {
            return None;
        }
        let escaped = regex::escape(&domain.to_lowercase());
        Regex::new(&format!(r"^(?:[a-z0-9_-]+\.)*{}$", escaped)).ok()
    }
}

/// Mock fetcher with canned responses and call tracking.
///
/// Clones share state, so a clone handed to a connector can be inspected
/// from the test afterwards.
#[derive(Default)]
pub struct MockFetcher {
    /// Canned outcomes by URL: a payload, or a transport error message
    responses: Arc<RwLock<HashMap<String, Result<String, String>>>>,

    /// URLs fetched, in order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a mock with no canned responses (every fetch is a 404).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned payload for a URL (builder pattern).
    pub fn with_payload(self, url: impl Into<String>, payload: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), Ok(payload.into()));
        self
    }

    /// Add a canned transport error for a URL (builder pattern).
    pub fn with_error(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), Err(message.into()));
        self
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches issued.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, _headers: &[(String, String)]) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        match self.responses.read().unwrap().get(url) {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(message)) => Err(FetchError::Http(message.clone().into())),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

/// One publish observed by [`RecordingBus`], in publication order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Published {
    /// A name finding was published
    Name(NameFinding),
    /// An address finding was published
    Addr(AddrFinding),
}

/// Bus double that records every publish in order.
#[derive(Default)]
pub struct RecordingBus {
    published: Arc<RwLock<Vec<Published>>>,
}

impl RecordingBus {
    /// Create an empty recording bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order.
    pub fn published(&self) -> Vec<Published> {
        self.published.read().unwrap().clone()
    }

    /// Name findings only, in publication order.
    pub fn names(&self) -> Vec<NameFinding> {
        self.published()
            .into_iter()
            .filter_map(|p| match p {
                Published::Name(f) => Some(f),
                Published::Addr(_) => None,
            })
            .collect()
    }

    /// Address findings only, in publication order.
    pub fn addrs(&self) -> Vec<AddrFinding> {
        self.published()
            .into_iter()
            .filter_map(|p| match p {
                Published::Addr(f) => Some(f),
                Published::Name(_) => None,
            })
            .collect()
    }
}

impl Clone for RecordingBus {
    fn clone(&self) -> Self {
        Self {
            published: Arc::clone(&self.published),
        }
    }
}

#[async_trait]
impl FindingBus for RecordingBus {
    async fn publish_name(&self, finding: NameFinding) {
        self.published.write().unwrap().push(Published::Name(finding));
    }

    async fn publish_addr(&self, finding: AddrFinding) {
        self.published.write().unwrap().push(Published::Addr(finding));
    }
}
