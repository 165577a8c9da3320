//! Scope enforcement seam.
//!
//! The scope engine itself (how roots are configured, how the regexes are
//! built) belongs to the embedding application; connectors only consume it.
//! The gate is checked before any I/O, and the per-domain matcher is the
//! shared defense against sources returning hosts unrelated to the queried
//! domain.

use regex::Regex;

/// Decides which domains the pipeline may investigate.
///
/// Shared read-only across all connector instances; never mutated by a
/// connector.
pub trait Scope: Send + Sync + 'static {
    /// Whether `domain` is inside the configured scope.
    fn is_in_scope(&self, domain: &str) -> bool;

    /// Anchored matcher for names belonging to `domain` or its subdomains.
    ///
    /// Returns `None` when no matcher is configured for the domain, in
    /// which case no name finding for it can be published.
    fn name_matcher(&self, domain: &str) -> Option<Regex>;
}
