// crates/sync-engine/src/sink.rs
//! Where progress records are written

use crate::error::SyncResult;
use async_trait::async_trait;
use shelfplay_core::ProgressRecord;
use shelfplay_network::MediaGateway;
use std::sync::Arc;

/// Destination for progress writes
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn push(&self, record: &ProgressRecord) -> SyncResult<()>;
}

/// Writes through a `MediaGateway`, which picks the configured endpoint
pub struct GatewaySink {
    gateway: Arc<dyn MediaGateway>,
}

impl GatewaySink {
    pub fn new(gateway: Arc<dyn MediaGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ProgressSink for GatewaySink {
    async fn push(&self, record: &ProgressRecord) -> SyncResult<()> {
        self.gateway.push_progress(record).await?;
        Ok(())
    }
}
