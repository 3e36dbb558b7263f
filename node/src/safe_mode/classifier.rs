//! Pure classification of a candidate fork into a [`SafeModeLevel`].

use super::config::SafeModeConfig;
use super::types::{BlockRef, ChainView, SafeModeLevel};

/// Classify the fork `(fork_tip, fork_base)` against the currently active
/// chain. Returns `SafeModeLevel::None` at the first gate the fork fails to
/// clear. The gates combine closeness-in-height, minimum length and a
/// proof-of-work floor: a short but absurdly heavy fork is still alarming,
/// while a long but ancient or trivially light one is not.
///
/// Preconditions (debug-asserted, not recovered from): both refs are valid
/// handles, `fork_tip.height() >= fork_base.height()`, and `chain` has an
/// active tip.
pub fn classify<C: ChainView>(
    config: &SafeModeConfig,
    chain: &C,
    fork_tip: &C::Ref,
    fork_base: &C::Ref,
) -> SafeModeLevel {
    debug_assert!(
        fork_tip.height() >= fork_base.height(),
        "fork_tip must not be below fork_base"
    );

    let active_tip = match chain.tip() {
        Some(t) => t,
        None => return SafeModeLevel::None,
    };

    // Gate 0: already absorbed into the active chain.
    if chain.contains(fork_tip) {
        return SafeModeLevel::None;
    }

    // Gate 1: length.
    let fork_length = fork_tip.height() - fork_base.height() + 1;
    if fork_length < config.min_fork_length {
        return SafeModeLevel::None;
    }

    // Gate 2: distance. Assertion mirrors the original's
    // `assert(chainActive.Tip()->height >= forkBase->height - 1)`.
    debug_assert!(active_tip.height() + 1 >= fork_base.height());
    let fork_base_distance = active_tip.height() + 1 - fork_base.height();
    if fork_base_distance > config.max_fork_distance {
        return SafeModeLevel::None;
    }

    // Gate 3: proof-of-work floor, saturating at zero rather than going negative.
    let delta = chain.block_proof(&active_tip) * (config.min_fork_height_difference.unsigned_abs() as u128);
    let meets_pow = if config.min_fork_height_difference > 0 {
        fork_tip.chain_work() >= active_tip.chain_work().saturating_add(delta)
    } else {
        fork_tip.chain_work() >= active_tip.chain_work().saturating_sub(delta)
    };
    if !meets_pow {
        return SafeModeLevel::None;
    }

    let status = fork_tip.status();
    if status.invalid {
        return SafeModeLevel::Invalid;
    }
    if status.scripts_valid && fork_tip.chain_tx() > 0 {
        return SafeModeLevel::Valid;
    }
    SafeModeLevel::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_mode::block_index::{BlockIndex, IndexedBlockRef};
    use crate::safe_mode::types::BlockStatus;

    fn hash(n: u8) -> [u8; 32] {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    fn config() -> SafeModeConfig {
        SafeModeConfig {
            min_fork_length: 3,
            max_fork_distance: 1000,
            min_fork_height_difference: 1,
            ..Default::default()
        }
    }

    fn build_chain(len: u64) -> (BlockIndex, Vec<IndexedBlockRef>) {
        let idx = BlockIndex::new();
        let mut blocks = vec![idx.insert_genesis(hash(0), 1000)];
        for i in 1..len {
            let prev = blocks.last().unwrap().clone();
            let b = idx.insert_block(hash(i as u8), &prev, 1, 1000 + i, BlockStatus::valid(), 1);
            idx.set_active_tip(&b);
            blocks.push(b);
        }
        (idx, blocks)
    }

    #[test]
    fn fork_on_active_chain_is_none() {
        let (idx, blocks) = build_chain(5);
        let level = classify(&config(), &idx, &blocks[3], &blocks[1]);
        assert_eq!(level, SafeModeLevel::None);
    }

    #[test]
    fn length_gate_boundary() {
        let (idx, blocks) = build_chain(5);
        let base = &blocks[1];

        // f1 alone gives forkLength == 2 (one short of minForkLength == 3).
        let f1 = idx.insert_block(hash(100), base, 10, 2000, BlockStatus::valid(), 1);
        assert_eq!(classify(&config(), &idx, &f1, base), SafeModeLevel::None);

        // f2 gives forkLength == 3 == minForkLength, passes.
        let f2 = idx.insert_block(hash(101), &f1, 10, 2001, BlockStatus::valid(), 1);
        assert_ne!(classify(&config(), &idx, &f2, base), SafeModeLevel::None);
    }

    #[test]
    fn distance_gate_boundary() {
        let (idx, blocks) = build_chain(5);
        let mut cfg = config();
        cfg.min_fork_length = 1;
        cfg.max_fork_distance = 0;
        let active_tip = blocks.last().unwrap().clone();

        // Fork base is a child of the active tip: distance == 0, passes.
        let base_above_tip = idx.insert_block(hash(100), &active_tip, 10, 2000, BlockStatus::valid(), 1);
        assert_ne!(classify(&cfg, &idx, &base_above_tip, &base_above_tip), SafeModeLevel::None);

        // Fork base is a sibling of the active tip (child of tip's parent):
        // distance == 1 > 0, fails.
        let tips_parent = blocks[blocks.len() - 2].clone();
        let sibling = idx.insert_block(hash(101), &tips_parent, 10, 2001, BlockStatus::valid(), 1);
        assert_eq!(classify(&cfg, &idx, &sibling, &sibling), SafeModeLevel::None);
    }

    #[test]
    fn pow_gate_saturates_at_zero_for_negative_sign() {
        let (idx, blocks) = build_chain(2);
        let mut cfg = config();
        cfg.min_fork_height_difference = -1_000_000; // delta will dwarf chain_work
        cfg.min_fork_length = 1;
        cfg.max_fork_distance = 1000;

        let base = &blocks[0];
        let f1 = idx.insert_block(hash(100), base, 1, 2000, BlockStatus::valid(), 1);
        // Saturating subtraction clamps the floor to zero, so any non-zero
        // work passes.
        assert_ne!(classify(&cfg, &idx, &f1, base), SafeModeLevel::None);
    }

    #[test]
    fn invalid_status_outranks_valid() {
        let (idx, blocks) = build_chain(2);
        let cfg = SafeModeConfig {
            min_fork_length: 1,
            max_fork_distance: 1000,
            min_fork_height_difference: -1,
            ..Default::default()
        };
        let base = &blocks[0];
        let f1 = idx.insert_block(hash(100), base, 5, 2000, BlockStatus::invalid(), 1);
        assert_eq!(classify(&cfg, &idx, &f1, base), SafeModeLevel::Invalid);
    }

    #[test]
    fn headers_only_is_unknown() {
        let (idx, blocks) = build_chain(2);
        let cfg = SafeModeConfig {
            min_fork_length: 1,
            max_fork_distance: 1000,
            min_fork_height_difference: -1,
            ..Default::default()
        };
        let base = &blocks[0];
        let f1 = idx.insert_block(hash(100), base, 5, 2000, BlockStatus::headers_only(), 0);
        assert_eq!(classify(&cfg, &idx, &f1, base), SafeModeLevel::Unknown);
    }
}
