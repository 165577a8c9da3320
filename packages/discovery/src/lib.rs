//! Pluggable Intelligence-Source Connector Library
//!
//! Each connector binds one external data source to a shared discovery
//! pipeline: it accepts work requests naming a domain, queries the source,
//! normalizes the response into name and address findings, and publishes
//! them onto a shared bus for downstream deduplication and resolution.
//!
//! # Design Philosophy
//!
//! The shared lifecycle machinery is composition, not inheritance: one
//! generic engine ([`Connector`]) plus a small per-source capability trait
//! ([`DataSource`]) covering URL construction and payload extraction.
//! Scope enforcement, the fetch seam, and typed bus publication are shared
//! by every connector; only the wire format is source-specific.
//!
//! # Usage
//!
//! ```rust,ignore
//! use discovery::testing::StaticScope;
//! use discovery::{ChannelBus, Connector, HttpFetcher, ThreatCrowd, WorkRequest};
//!
//! let bus = ChannelBus::new(name_tx, addr_tx);
//! let scope = StaticScope::new().with_domain("example.com");
//!
//! let (mut connector, requests) =
//!     Connector::new(ThreatCrowd::new(), HttpFetcher::new(), bus, scope);
//! let handle = connector.start()?;
//!
//! requests.send(WorkRequest::new("example.com")).await?;
//! // ... findings arrive on name_rx / addr_rx ...
//!
//! connector.stop();
//! handle.await?;
//! ```
//!
//! # Modules
//!
//! - [`worker`] - The generic connector engine (lifecycle + processing loop)
//! - [`sources`] - Per-source capability trait and source bindings
//! - [`types`] - Work requests, findings, source identity
//! - [`scope`] - Scope enforcement seam
//! - [`fetch`] - Fetch seam and the default HTTP fetcher
//! - [`bus`] - Typed finding publication
//! - [`testing`] - Mock collaborators for tests

pub mod bus;
pub mod error;
pub mod fetch;
pub mod scope;
pub mod sources;
pub mod testing;
pub mod types;
pub mod worker;

// Re-export core types at crate root
pub use bus::{ChannelBus, FindingBus};
pub use error::{ExtractError, FetchError, WorkerError};
pub use fetch::{Fetcher, HttpFetcher};
pub use scope::Scope;
pub use sources::{DataSource, RawFindings, ThreatCrowd};
pub use types::{AddrFinding, NameFinding, SourceIdentity, SourceKind, WorkRequest};
pub use worker::Connector;
