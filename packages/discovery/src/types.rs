//! Data types shared across connectors.
//!
//! Inbound work and outbound findings are distinct types: a [`WorkRequest`]
//! only ever names a domain, and a finding only ever carries one discovered
//! name or one discovered address, always stamped with the identity of the
//! connector that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One inbound unit of work: query the source about a single domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRequest {
    /// The root domain to investigate.
    pub domain: String,
}

impl WorkRequest {
    /// Create a request for a domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

/// Provenance tag describing how a source produces its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Queried through a passive API
    Api,
    /// Mined from a web archive
    Archive,
    /// Harvested from certificate transparency
    Cert,
    /// Observed through DNS records
    Dns,
    /// Scraped from web pages
    Scrape,
}

impl SourceKind {
    /// Stable string form used in logs and downstream records.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Api => "api",
            SourceKind::Archive => "archive",
            SourceKind::Cert => "cert",
            SourceKind::Dns => "dns",
            SourceKind::Scrape => "scrape",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one connector, fixed at construction.
///
/// Stamped onto every finding the connector publishes so downstream stages
/// can attribute each discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    /// Display name of the data source (e.g. "ThreatCrowd").
    pub name: String,

    /// How this source produces its data.
    pub kind: SourceKind,
}

impl SourceIdentity {
    /// Create an identity.
    pub fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A discovered name, normalized and attributed.
///
/// Always lowercase and already matched against the scope regex for its
/// domain by the time it is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameFinding {
    /// The discovered name (lowercase).
    pub name: String,

    /// The domain that was queried.
    pub domain: String,

    /// Provenance tag of the producing source.
    pub tag: SourceKind,

    /// Display name of the producing source.
    pub source: String,
}

impl NameFinding {
    /// Create a finding stamped with a connector's identity.
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        identity: &SourceIdentity,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            tag: identity.kind,
            source: identity.name.clone(),
        }
    }
}

/// A discovered network address, attributed to the queried domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddrFinding {
    /// The discovered address, as reported by the source.
    pub address: String,

    /// The domain that was queried.
    pub domain: String,

    /// Provenance tag of the producing source.
    pub tag: SourceKind,

    /// Display name of the producing source.
    pub source: String,
}

impl AddrFinding {
    /// Create a finding stamped with a connector's identity.
    pub fn new(
        address: impl Into<String>,
        domain: impl Into<String>,
        identity: &SourceIdentity,
    ) -> Self {
        Self {
            address: address.into(),
            domain: domain.into(),
            tag: identity.kind,
            source: identity.name.clone(),
        }
    }
}
