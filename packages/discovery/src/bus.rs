//! Finding publication seam.
//!
//! Connectors only ever produce onto the bus; the transport behind it is an
//! external collaborator. Two explicit methods instead of string-keyed
//! topics keep the payload shape of each topic checked at compile time.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::types::{AddrFinding, NameFinding};

/// Outbound channel for normalized findings.
///
/// Implementations must tolerate many concurrent producers; connectors
/// treat publication as fire-and-forget.
#[async_trait]
pub trait FindingBus: Send + Sync + 'static {
    /// Publish a discovered name.
    async fn publish_name(&self, finding: NameFinding);

    /// Publish a discovered address.
    async fn publish_addr(&self, finding: AddrFinding);
}

/// Bus adapter that forwards findings onto a pair of `mpsc` senders.
///
/// Wires connectors to downstream deduplication/resolution stages. Clone
/// one per connector; the senders fan in to the same receivers.
#[derive(Clone)]
pub struct ChannelBus {
    names: mpsc::Sender<NameFinding>,
    addrs: mpsc::Sender<AddrFinding>,
}

impl ChannelBus {
    /// Create an adapter over the downstream senders.
    pub fn new(names: mpsc::Sender<NameFinding>, addrs: mpsc::Sender<AddrFinding>) -> Self {
        Self { names, addrs }
    }
}

#[async_trait]
impl FindingBus for ChannelBus {
    async fn publish_name(&self, finding: NameFinding) {
        if let Err(e) = self.names.send(finding).await {
            // Downstream dropped its receiver; nothing to retry at this layer.
            debug!(name = %e.0.name, "name channel closed, finding dropped");
        }
    }

    async fn publish_addr(&self, finding: AddrFinding) {
        if let Err(e) = self.addrs.send(finding).await {
            debug!(address = %e.0.address, "address channel closed, finding dropped");
        }
    }
}
