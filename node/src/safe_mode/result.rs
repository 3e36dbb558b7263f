//! Aggregates classified forks into a [`SafeModeResult`].

use super::types::{compare_block_refs, BlockRef, SafeModeLevel};
use std::collections::BTreeMap;

/// A `forkBase` together with the tips currently sharing it.
#[derive(Clone)]
pub struct SafeModeFork<R: BlockRef> {
    pub base: R,
    pub tips: Vec<R>,
    pub level: SafeModeLevel,
}

/// Wraps a `BlockRef` so it can key a `BTreeMap` by the total order
/// deterministic output requires (height, then block hash).
#[derive(Clone)]
struct OrderedRef<R: BlockRef>(R);

impl<R: BlockRef> PartialEq for OrderedRef<R> {
    fn eq(&self, other: &Self) -> bool {
        compare_block_refs(&self.0, &other.0) == std::cmp::Ordering::Equal
    }
}
impl<R: BlockRef> Eq for OrderedRef<R> {}
impl<R: BlockRef> PartialOrd for OrderedRef<R> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<R: BlockRef> Ord for OrderedRef<R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        compare_block_refs(&self.0, &other.0)
    }
}

/// `(activeTip, mapping forkBase -> SafeModeFork, maxLevel)`.
///
/// Equality ignores `activeTip`'s identity beyond its hash: two results are
/// equal iff they contain the same set of `(forkBase, tips-set, level)`
/// triples with the same `maxLevel` and the same active tip hash. The
/// serialised JSON uses this same comparison to decide whether a result is
/// byte-identical to the last one emitted, modulo its timestamp.
pub struct SafeModeResult<R: BlockRef> {
    pub active_tip: Option<R>,
    forks: BTreeMap<OrderedRef<R>, SafeModeFork<R>>,
    pub max_level: SafeModeLevel,
}

impl<R: BlockRef> SafeModeResult<R> {
    pub fn empty(active_tip: Option<R>) -> Self {
        Self {
            active_tip,
            forks: BTreeMap::new(),
            max_level: SafeModeLevel::None,
        }
    }

    pub fn forks(&self) -> impl Iterator<Item = &SafeModeFork<R>> {
        self.forks.values()
    }

    pub fn fork_count(&self) -> usize {
        self.forks.len()
    }
}

impl<R: BlockRef> PartialEq for SafeModeResult<R> {
    fn eq(&self, other: &Self) -> bool {
        if self.max_level != other.max_level {
            return false;
        }
        let active_eq = match (&self.active_tip, &other.active_tip) {
            (None, None) => true,
            (Some(a), Some(b)) => a.block_hash() == b.block_hash(),
            _ => false,
        };
        if !active_eq {
            return false;
        }
        if self.forks.len() != other.forks.len() {
            return false;
        }
        self.forks.iter().zip(other.forks.iter()).all(|((ka, fa), (kb, fb))| {
            ka.0.block_hash() == kb.0.block_hash()
                && fa.level == fb.level
                && fa.tips.len() == fb.tips.len()
                && fa
                    .tips
                    .iter()
                    .zip(fb.tips.iter())
                    .all(|(ta, tb)| ta.block_hash() == tb.block_hash())
        })
    }
}

/// Collects `(forkTip, forkBase, level)` triples as the monitor classifies
/// each tracked fork, grouping by `forkBase`.
pub struct ResultBuilder<R: BlockRef> {
    result: SafeModeResult<R>,
}

impl<R: BlockRef> ResultBuilder<R> {
    pub fn new(active_tip: Option<R>) -> Self {
        Self {
            result: SafeModeResult::empty(active_tip),
        }
    }

    pub fn add_fork(&mut self, fork_tip: R, fork_base: R, level: SafeModeLevel) {
        self.result.max_level = self.result.max_level.max(level);

        let key = OrderedRef(fork_base.clone());
        match self.result.forks.get_mut(&key) {
            Some(existing) => {
                existing.level = existing.level.max(level);
                if !existing.tips.iter().any(|t| t == &fork_tip) {
                    existing.tips.push(fork_tip);
                    existing
                        .tips
                        .sort_by(|a, b| compare_block_refs(a, b));
                }
            }
            None => {
                self.result.forks.insert(
                    key,
                    SafeModeFork {
                        base: fork_base,
                        tips: vec![fork_tip],
                        level,
                    },
                );
            }
        }
    }

    pub fn build(self) -> SafeModeResult<R> {
        self.result
    }
}
