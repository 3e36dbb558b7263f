//! Truncates a fork at the last operator-ignored block.

use super::types::BlockRef;

/// Walk from `fork_tip` down to (and including) `fork_base`, tracking the
/// last block encountered with `ignored_for_safe_mode` set.
///
/// - No block ignored: returns `fork_tip` unchanged.
/// - The base itself is the last ignored block: the whole fork is
///   suppressed, returns `None`.
/// - Otherwise: returns the parent of the last ignored block, exposing
///   only the un-ignored prefix of the fork to classification.
pub fn effective_tip<R: BlockRef>(fork_tip: &R, fork_base: &R) -> Option<R> {
    let mut last_ignored: Option<R> = None;
    let mut walk = fork_tip.clone();
    loop {
        if walk.ignored_for_safe_mode() {
            last_ignored = Some(walk.clone());
        }
        if &walk == fork_base {
            break;
        }
        match walk.parent() {
            Some(p) => walk = p,
            None => break,
        }
    }

    match last_ignored {
        None => Some(fork_tip.clone()),
        Some(ref ignored) if ignored == fork_base => None,
        Some(ignored) => ignored.parent(),
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

    #[test]
    fn no_ignored_block_returns_tip() {
        let idx = BlockIndex::new();
        let base = idx.insert_genesis(hash(0), 1000);
        let tip = idx.insert_block(hash(1), &base, 1, 1001, BlockStatus::valid(), 1);
        assert_eq!(effective_tip(&tip, &base), Some(tip));
    }

    #[test]
    fn ignored_tip_truncates_to_its_parent() {
        let idx = BlockIndex::new();
        let base = idx.insert_genesis(hash(0), 1000);
        let mid = idx.insert_block(hash(1), &base, 1, 1001, BlockStatus::valid(), 1);
        let tip = idx.insert_block(hash(2), &mid, 1, 1002, BlockStatus::valid(), 1);
        idx.mark_ignored(&tip, true);

        assert_eq!(effective_tip(&tip, &base), Some(mid));
    }

    #[test]
    fn ignored_base_suppresses_whole_fork() {
        let idx = BlockIndex::new();
        let base = idx.insert_genesis(hash(0), 1000);
        let tip = idx.insert_block(hash(1), &base, 1, 1001, BlockStatus::valid(), 1);
        idx.mark_ignored(&base, true);

        assert_eq!(effective_tip(&tip, &base), None);
    }
}
