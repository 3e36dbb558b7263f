//! Core types and external-collaborator traits for the safe-mode fork monitor.
//!
//! The monitor never owns the block-index DAG: it is handed a `ChainView`
//! and `BlockRef` handles into it. The only concrete implementation shipped
//! here is [`crate::safe_mode::block_index::BlockIndex`], which exists to
//! make the module runnable and testable in isolation from the rest of the
//! node's storage layer.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Validity bits tracked independently, mirroring upstream's `BlockStatus`
/// (tree-validity and script-validity are not collapsible into one enum:
/// the JSON status derivation in `serialiser.rs` needs both).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockStatus {
    pub invalid: bool,
    pub tree_valid: bool,
    pub scripts_valid: bool,
}

impl BlockStatus {
    pub const fn valid() -> Self {
        Self {
            invalid: false,
            tree_valid: true,
            scripts_valid: true,
        }
    }

    pub const fn headers_only() -> Self {
        Self {
            invalid: false,
            tree_valid: true,
            scripts_valid: false,
        }
    }

    pub const fn invalid() -> Self {
        Self {
            invalid: true,
            tree_valid: false,
            scripts_valid: false,
        }
    }
}

/// A read-only handle into the external block-index DAG.
///
/// Equality is identity of the node in the DAG, not value equality of its
/// fields: two distinct blocks at the same height with the same hash
/// (impossible in practice, but not ruled out by the type) are still
/// distinct `BlockRef`s.
pub trait BlockRef: Clone + PartialEq {
    fn height(&self) -> u64;
    fn chain_work(&self) -> u128;
    fn parent(&self) -> Option<Self>;
    fn block_hash(&self) -> [u8; 32];
    fn block_time(&self) -> u64;
    fn header_received_time(&self) -> u64;
    fn status(&self) -> BlockStatus;
    /// Number of transactions for which full block data is present. Zero
    /// iff only the header has been received.
    fn chain_tx(&self) -> u64;
    fn ignored_for_safe_mode(&self) -> bool;
}

/// The node's current active chain, as seen by the monitor.
///
/// Backed by external mutable state; the monitor never mutates it.
pub trait ChainView {
    type Ref: BlockRef + Eq + std::hash::Hash;

    fn tip(&self) -> Option<Self::Ref>;
    fn contains(&self, block: &Self::Ref) -> bool;
    /// The child of `block` on the active chain, or `None` if `block` is
    /// not on the active chain or is the tip.
    fn next(&self, block: &Self::Ref) -> Option<Self::Ref>;
    /// Every currently known tip that is not the active tip.
    fn fork_tips(&self) -> Vec<Self::Ref>;
    /// Expected proof-of-work of one block mined at `block`'s difficulty.
    fn block_proof(&self, block: &Self::Ref) -> u128;
}

/// A total order on `BlockRef`s for deterministic output: height ascending,
/// then block hash lexicographically.
pub fn compare_block_refs<B: BlockRef>(a: &B, b: &B) -> Ordering {
    a.height()
        .cmp(&b.height())
        .then_with(|| a.block_hash().cmp(&b.block_hash()))
}

/// Danger level of the most alarming fork currently tracked.
///
/// Ordering is intentionally `None < Valid < Invalid < Unknown`: `Unknown`
/// denotes a heavy fork the node hasn't even validated yet, which is more
/// alarming than one it has proven invalid. Do not re-sort this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SafeModeLevel {
    None,
    Valid,
    Invalid,
    Unknown,
}

impl Default for SafeModeLevel {
    fn default() -> Self {
        SafeModeLevel::None
    }
}

impl std::fmt::Display for SafeModeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SafeModeLevel::None => "NONE",
            SafeModeLevel::Valid => "VALID",
            SafeModeLevel::Invalid => "INVALID",
            SafeModeLevel::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}
