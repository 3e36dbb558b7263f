//! Maintains the forkTip → forkBase mapping for all known non-active tips
//! within the relevance window.

use super::config::SafeModeConfig;
use super::types::{BlockRef, ChainView};
use std::collections::HashMap;
use std::hash::Hash;

/// `forkTip -> forkBase` for every tracked fork.
///
/// Invariants, maintained at the end of every public operation:
/// 1. No key is on the active chain.
/// 2. For every entry, walking parents from `forkTip` reaches `forkBase`
///    without crossing the active chain.
/// 3. `forkBase`'s parent's height is >= `min_relevant_height`.
/// 4. No two entries share a `forkTip` (guaranteed by `HashMap` keying).
pub struct ForkTable<R: BlockRef + Eq + Hash> {
    entries: HashMap<R, R>,
}

impl<R: BlockRef + Eq + Hash> Default for ForkTable<R> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<R: BlockRef + Eq + Hash> ForkTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&R, &R)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn min_relevant_height<C: ChainView<Ref = R>>(chain: &C, config: &SafeModeConfig) -> u64 {
        let tip_height = chain.tip().map(|t| t.height()).unwrap_or(0);
        tip_height.saturating_sub(config.max_fork_distance)
    }

    /// True if `candidate` appears on the parent-walk from some tracked
    /// `forkTip` down to (not including past) its `forkBase`.
    fn is_part_of_existing_fork(&self, candidate: &R) -> bool {
        for (tip, base) in &self.entries {
            let mut walk = Some(tip.clone());
            while let Some(w) = walk {
                if &w == base {
                    break;
                }
                if &w == candidate {
                    return true;
                }
                walk = w.parent();
            }
        }
        false
    }

    /// Register a newly-known block. Idempotent under the invariants.
    /// Spec.md §4.2's five-step policy.
    pub fn insert_new<C: ChainView<Ref = R>>(&mut self, chain: &C, config: &SafeModeConfig, new_ref: R) {
        if chain.contains(&new_ref) {
            return;
        }
        if self.is_part_of_existing_fork(&new_ref) {
            return;
        }
        if let Some(tip) = chain.tip() {
            if new_ref.parent().as_ref() == Some(&tip) {
                return;
            }
        }

        if let Some(parent) = new_ref.parent() {
            if let Some(base) = self.entries.remove(&parent) {
                self.entries.insert(new_ref, base);
                return;
            }
        }

        let min_height = Self::min_relevant_height(chain, config);
        let mut walk = new_ref.clone();
        loop {
            if walk.height() < min_height {
                break;
            }
            match walk.parent() {
                None => break,
                Some(parent) => {
                    if chain.contains(&parent) {
                        self.entries.insert(new_ref, walk);
                        break;
                    }
                    walk = parent;
                }
            }
        }
    }

    /// Restore invariants after a tip change without a full rebuild.
    pub fn revalidate<C: ChainView<Ref = R>>(&mut self, chain: &C) {
        let mut next = HashMap::with_capacity(self.entries.len());
        for (tip, base) in self.entries.drain() {
            if chain.contains(&tip) {
                // Fork fully absorbed into the active chain; drop it.
                continue;
            }
            if chain.contains(&base) {
                let mut walk = tip.clone();
                loop {
                    match walk.parent() {
                        Some(p) if !chain.contains(&p) => walk = p,
                        _ => break,
                    }
                }
                next.insert(tip, walk);
            } else {
                next.insert(tip, base);
            }
        }
        self.entries = next;
    }

    /// Drop every entry whose `base.parent.height` is below the relevance
    /// window.
    pub fn prune<C: ChainView<Ref = R>>(&mut self, chain: &C, config: &SafeModeConfig) {
        let min_height = Self::min_relevant_height(chain, config);
        self.entries.retain(|_, base| match base.parent() {
            Some(p) => p.height() >= min_height,
            None => true,
        });
    }

    /// Clear the table and re-derive it from `chain.fork_tips()`.
    pub fn rebuild<C: ChainView<Ref = R>>(&mut self, chain: &C, config: &SafeModeConfig) {
        self.entries.clear();
        for tip in chain.fork_tips() {
            self.insert_new(chain, config, tip);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_mode::block_index::BlockIndex;
    use crate::safe_mode::types::BlockStatus;

    fn hash(n: u8) -> [u8; 32] {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    fn config() -> SafeModeConfig {
        SafeModeConfig {
            min_fork_length: 1,
            max_fork_distance: 1000,
            min_fork_height_difference: 1,
            ..Default::default()
        }
    }

    #[test]
    fn insert_new_ignores_active_chain_extension() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);

        let mut table = ForkTable::new();
        table.insert_new(&idx, &config(), a1.clone());
        assert!(table.is_empty());
    }

    #[test]
    fn insert_new_tracks_new_fork_tip() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);
        let f1 = idx.insert_block(hash(2), &genesis, 1, 1011, BlockStatus::valid(), 1);

        let mut table = ForkTable::new();
        table.insert_new(&idx, &config(), f1.clone());
        assert_eq!(table.len(), 1);
        let (_, base) = table.entries().next().unwrap();
        assert_eq!(base, &genesis);
    }

    #[test]
    fn insert_new_extends_existing_fork_tip() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);
        let f1 = idx.insert_block(hash(2), &genesis, 1, 1011, BlockStatus::valid(), 1);

        let mut table = ForkTable::new();
        table.insert_new(&idx, &config(), f1.clone());

        let f2 = idx.insert_block(hash(3), &f1, 1, 1012, BlockStatus::valid(), 1);
        table.insert_new(&idx, &config(), f2.clone());

        assert_eq!(table.len(), 1);
        let (tip, base) = table.entries().next().unwrap();
        assert_eq!(tip, &f2);
        assert_eq!(base, &genesis);
    }

    #[test]
    fn revalidate_drops_absorbed_fork() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let f1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);

        let mut table = ForkTable::new();
        table.insert_new(&idx, &config(), f1.clone());
        assert_eq!(table.len(), 1);

        // The fork becomes the active chain.
        idx.set_active_tip(&f1);
        table.revalidate(&idx);
        assert!(table.is_empty());
    }

    #[test]
    fn prune_drops_out_of_window_forks() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let mut active = genesis.clone();
        for i in 1..20u8 {
            let b = idx.insert_block(hash(i), &active, 1, 1000 + i as u64, BlockStatus::valid(), 1);
            idx.set_active_tip(&b);
            active = b;
        }
        let f1 = idx.insert_block(hash(200), &genesis, 1, 2000, BlockStatus::valid(), 1);

        let mut table = ForkTable::new();
        table.insert_new(&idx, &config(), f1.clone());
        assert_eq!(table.len(), 1);

        let mut tight_cfg = config();
        tight_cfg.max_fork_distance = 2;
        table.prune(&idx, &tight_cfg);
        assert!(table.is_empty());
    }
}
