//! Errors for the safe-mode fork monitor's two fallible boundaries.
//!
//! The classification/fork-table hot path is infallible by design and uses
//! `debug_assert!` for precondition violations. This type only covers
//! serialisation and webhook delivery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SafeModeError {
    #[error("webhook dispatch failed: {0}")]
    WebhookDelivery(#[from] reqwest::Error),

    #[error("failed to serialise safe-mode result: {0}")]
    Serialisation(#[from] serde_json::Error),
}
