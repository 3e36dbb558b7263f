//! Safe-mode fork monitor: watches competing chain tips and classifies how
//! dangerous each one is, so the node (and its operator) can tell a
//! harmless minority fork apart from a heavier, possibly-invalid one.
//!
//! The module is generic over the node's actual block-index representation
//! through the [`types::ChainView`]/[`types::BlockRef`] traits; production
//! call sites plug in their own storage. [`block_index::BlockIndex`] is the
//! in-memory reference implementation used by this module's own tests.

mod alert;
mod block_index;
mod classifier;
mod config;
mod error;
mod fork_table;
mod ignore_filter;
mod monitor;
mod result;
mod serialiser;
mod types;
mod webhook;

pub use alert::{AlertSink, TracingAlertSink};
pub use block_index::{BlockIndex, IndexedBlock, IndexedBlockRef};
pub use config::SafeModeConfig;
pub use error::SafeModeError;
pub use monitor::{ChainGuard, Monitor};
pub use result::{SafeModeFork, SafeModeResult};
pub use types::{BlockRef, BlockStatus, ChainView, SafeModeLevel};
pub use webhook::{ReqwestWebhookDispatcher, WebhookDispatcher};

use std::sync::Arc;
use std::time::Duration;

/// Construct a monitor wired to a real webhook dispatcher and the node's
/// tracing-backed alert channel. Most call sites want this; tests and
/// embedders that need to observe dispatches directly should build a
/// [`Monitor`] themselves with a recording implementation.
pub fn init<C: ChainView>(config: SafeModeConfig) -> Monitor<C> {
    let webhook_timeout = config.webhook_timeout;
    Monitor::new(
        config,
        Arc::new(ReqwestWebhookDispatcher::new(webhook_timeout)),
        Arc::new(TracingAlertSink),
    )
}

/// As [`init`], but with an explicit webhook timeout override, for callers
/// that construct the config before the rest of the node's config tree is
/// available.
pub fn init_with_timeout<C: ChainView>(
    mut config: SafeModeConfig,
    webhook_timeout: Duration,
) -> Monitor<C> {
    config.webhook_timeout = webhook_timeout;
    init(config)
}
