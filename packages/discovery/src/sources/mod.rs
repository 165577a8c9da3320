//! Per-source capability interfaces.
//!
//! Each connector binds the generic worker to one external data source by
//! implementing [`DataSource`]: how to build the query URL and how to turn
//! that source's raw payload into candidate findings. Everything else
//! (lifecycle, scope enforcement, publication) is shared by the worker.

pub mod threatcrowd;

pub use threatcrowd::ThreatCrowd;

use crate::error::ExtractResult;
use crate::types::SourceIdentity;

/// Candidate findings extracted from one raw payload.
///
/// Names are pre-lowercasing and unscoped; the worker normalizes and gates
/// them before publication. Order follows the source payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFindings {
    /// Candidate names, in payload order.
    pub names: Vec<String>,

    /// Candidate network addresses, in payload order.
    pub addresses: Vec<String>,
}

impl RawFindings {
    /// True when the payload yielded nothing.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.addresses.is_empty()
    }
}

/// Capability interface one data source supplies to the generic worker.
///
/// Implementations are stateless with respect to requests: the worker calls
/// [`query_url`](DataSource::query_url) and
/// [`extract`](DataSource::extract) once per accepted request.
pub trait DataSource: Send + Sync + 'static {
    /// Identity stamped onto every finding this source produces.
    fn identity(&self) -> &SourceIdentity;

    /// Build the query URL for a domain.
    fn query_url(&self, domain: &str) -> String;

    /// Headers sent with every query.
    fn headers(&self) -> Vec<(String, String)> {
        vec![("Content-Type".to_string(), "application/json".to_string())]
    }

    /// Parse one raw payload into candidate findings.
    ///
    /// Implementations check their source's own success indicator first and
    /// return [`ExtractError::ReportedFailure`] when it signals no data.
    /// Scope is never enforced here; that is the worker's job.
    ///
    /// [`ExtractError::ReportedFailure`]: crate::error::ExtractError::ReportedFailure
    fn extract(&self, payload: &str, domain: &str) -> ExtractResult<RawFindings>;
}
