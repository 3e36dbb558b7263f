//! Operator alerting on transitions into `SafeModeLevel::Valid`.

use tracing::warn;

/// Abstraction over "notify the operator", so the monitor can be tested
/// without depending on the node's real alerting channel.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Default sink: a structured warning through `tracing`, matching every
/// other operator-facing log line in this crate
/// (`node::blockchain::invalidation`, `node::storage::persistence`).
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}
