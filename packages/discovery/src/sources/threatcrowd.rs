//! ThreatCrowd data source.
//!
//! Queries the ThreatCrowd domain report API, a passive source returning
//! known subdomains and historical IP resolutions for a domain. The report
//! embeds its own success indicator: `response_code` is `"1"` when data is
//! available.

use serde::Deserialize;

use crate::error::{ExtractError, ExtractResult};
use crate::sources::{DataSource, RawFindings};
use crate::types::{SourceIdentity, SourceKind};

const URL_TEMPLATE: &str = "https://www.threatcrowd.org/searchApi/v2/domain/report/?domain=";
const SUCCESS_CODE: &str = "1";

/// Connector binding for the ThreatCrowd domain report API.
pub struct ThreatCrowd {
    identity: SourceIdentity,
}

impl ThreatCrowd {
    /// Create the source, not yet wired to a worker.
    pub fn new() -> Self {
        Self {
            identity: SourceIdentity::new("ThreatCrowd", SourceKind::Api),
        }
    }
}

impl Default for ThreatCrowd {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire format of the domain report endpoint.
#[derive(Debug, Deserialize)]
struct DomainReport {
    #[serde(default)]
    response_code: String,

    #[serde(default)]
    subdomains: Vec<String>,

    #[serde(default)]
    resolutions: Vec<Resolution>,
}

#[derive(Debug, Deserialize)]
struct Resolution {
    #[serde(default)]
    ip_address: String,
}

impl DataSource for ThreatCrowd {
    fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    fn query_url(&self, domain: &str) -> String {
        format!("{}{}", URL_TEMPLATE, domain)
    }

    fn extract(&self, payload: &str, _domain: &str) -> ExtractResult<RawFindings> {
        let report: DomainReport = serde_json::from_str(payload)?;

        if report.response_code != SUCCESS_CODE {
            return Err(ExtractError::ReportedFailure {
                code: report.response_code,
            });
        }

        Ok(RawFindings {
            names: report.subdomains,
            addresses: report
                .resolutions
                .into_iter()
                .map(|r| r.ip_address)
                .filter(|ip| !ip.is_empty())
                .collect(),
        })
    }
}
