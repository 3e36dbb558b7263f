//! Orchestrates classification, caching and notification.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{info, warn};

use super::alert::AlertSink;
use super::classifier;
use super::config::SafeModeConfig;
use super::error::SafeModeError;
use super::fork_table::ForkTable;
use super::ignore_filter;
use super::result::{ResultBuilder, SafeModeResult};
use super::serialiser;
use super::types::{BlockRef, ChainView, SafeModeLevel};
use super::webhook::WebhookDispatcher;

/// Proof that the caller holds the node's chain lock (`cs_main` in the
/// original) for the duration of the call. The monitor never takes any
/// lock of its own over the block index; every method that touches
/// `ChainView` demands one of these, since the block index is an external
/// collaborator that owns its own lock. It carries no data: its only
/// purpose is to make "caller holds the chain lock" a type-level fact
/// instead of a comment.
pub struct ChainGuard(());

impl ChainGuard {
    /// Construct a guard. Callers are trusted to only call this while
    /// actually holding the chain lock; the type can't check that for you.
    pub fn assume_held() -> Self {
        ChainGuard(())
    }
}

/// Fork-monitor state, internally synchronised with its own lock
/// independent of the caller's chain lock.
pub struct Monitor<C: ChainView> {
    config: SafeModeConfig,
    fork_table: Mutex<ForkTable<C::Ref>>,
    last_active_tip: Mutex<Option<C::Ref>>,
    last_result: Mutex<Option<SafeModeResult<C::Ref>>>,
    global_level: Mutex<SafeModeLevel>,
    webhook: Arc<dyn WebhookDispatcher>,
    alert: Arc<dyn AlertSink>,
}

impl<C: ChainView> Monitor<C> {
    pub fn new(
        config: SafeModeConfig,
        webhook: Arc<dyn WebhookDispatcher>,
        alert: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            config,
            fork_table: Mutex::new(ForkTable::new()),
            last_active_tip: Mutex::new(None),
            last_result: Mutex::new(None),
            global_level: Mutex::new(SafeModeLevel::None),
            webhook,
            alert,
        }
    }

    /// Current danger level, without touching the chain or fork table.
    pub fn current_level(&self) -> SafeModeLevel {
        *self.global_level.lock()
    }

    /// Re-evaluate safe mode. `new_block` is the block that was just
    /// connected to the block index (it may extend the active chain, start
    /// a new fork, or extend an existing one), or `None` if the caller has
    /// no single block to report (e.g. a bulk reload).
    ///
    /// A genesis block never starts or extends a fork, so it short-circuits
    /// before touching the fork table.
    pub fn check(&self, _guard: &ChainGuard, chain: &C, new_block: Option<C::Ref>) -> SafeModeLevel {
        if let Some(nb) = &new_block {
            if nb.parent().is_none() {
                return self.current_level();
            }
        }

        let mut last_tip = self.last_active_tip.lock();
        // A reorg invalidates any cached assumption of what's on the active
        // chain, so the whole table is rebuilt from the chain's own fork-tip
        // set rather than patched incrementally.
        let reorg_happened = match &*last_tip {
            Some(t) => !chain.contains(t),
            None => false,
        };

        let mut table = self.fork_table.lock();
        if reorg_happened || new_block.is_none() {
            table.rebuild(chain, &self.config);
        } else if let Some(nb) = new_block {
            table.insert_new(chain, &self.config, nb);
        }
        table.revalidate(chain);
        table.prune(chain, &self.config);

        let current_tip = chain.tip();
        *last_tip = current_tip.clone();
        drop(last_tip);

        let mut builder = ResultBuilder::new(current_tip);
        for (tip, base) in table.entries() {
            let Some(effective_tip) = ignore_filter::effective_tip(tip, base) else {
                continue;
            };
            let level = classifier::classify(&self.config, chain, &effective_tip, base);
            if level != SafeModeLevel::None {
                builder.add_fork(tip.clone(), base.clone(), level);
            }
        }
        drop(table);

        let result = builder.build();
        self.apply_result(chain, result)
    }

    fn apply_result(&self, chain: &C, result: SafeModeResult<C::Ref>) -> SafeModeLevel {
        let new_level = result.max_level;

        let mut last_result = self.last_result.lock();
        let changed = match &*last_result {
            Some(prev) => prev != &result,
            None => true,
        };

        // Dispatch and log only fire on a changed result, and only when a
        // webhook is configured at all.
        if changed {
            if let Some(address) = &self.config.webhook_address {
                let body = serialiser::to_webhook_body(chain, &result);
                warn!("safe-mode status changed: {}", body.trim_end());
                self.webhook.dispatch(address.clone(), body);
            }
        }

        let mut global = self.global_level.lock();
        if *global != new_level {
            if new_level == SafeModeLevel::Valid {
                // The alert lists each fork's common-ancestor parent, i.e.
                // where the node's chain last agreed with the competing
                // fork before it diverged.
                let bases = result
                    .forks()
                    .map(|f| match f.base.parent() {
                        Some(p) => hex::encode(p.block_hash()),
                        None => "none".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.alert.alert(&format!(
                    "safe mode: level transitioned to VALID; fork parent blocks: [{}]",
                    bases
                ));
            }
            if new_level > *global {
                warn!("safe-mode level escalated: {} -> {}", *global, new_level);
            } else {
                info!("safe-mode level de-escalated: {} -> {}", *global, new_level);
            }
            *global = new_level;
        }
        drop(global);

        *last_result = Some(result);
        new_level
    }

    /// JSON snapshot of the last computed result, in the schema clients
    /// expect from the `getStatus` RPC. Returns the empty, disabled shape
    /// if `check` has never run.
    pub fn status(&self, _guard: &ChainGuard, chain: &C) -> Value {
        match &*self.last_result.lock() {
            Some(result) => serialiser::to_json(chain, result),
            None => serialiser::to_json(chain, &SafeModeResult::empty(chain.tip())),
        }
    }

    /// Drop all tracked fork state and reset the danger level to `None`,
    /// e.g. after a full chain re-sync.
    pub fn clear(&self, _guard: &ChainGuard) {
        self.fork_table.lock().clear();
        *self.last_active_tip.lock() = None;
        *self.last_result.lock() = None;
        *self.global_level.lock() = SafeModeLevel::None;
    }

    /// Force a full rebuild of the fork table from the chain's current
    /// fork-tip set, e.g. after the node's storage layer replaces the block
    /// index wholesale. Equivalent to [`Self::check`] with no new block,
    /// which takes the same rebuild path on a reorg or an unspecified
    /// change.
    pub fn rebuild(&self, guard: &ChainGuard, chain: &C) -> SafeModeLevel {
        self.check(guard, chain, None)
    }

    /// As [`Self::status`], but pretty-printed and fallible (convenient for
    /// an RPC handler that wants to hand a `String` body straight to its
    /// HTTP response).
    pub fn status_json(&self, _guard: &ChainGuard, chain: &C) -> Result<String, SafeModeError> {
        match &*self.last_result.lock() {
            Some(result) => serialiser::to_json_string(chain, result),
            None => serialiser::to_json_string(chain, &SafeModeResult::empty(chain.tip())),
        }
    }

    pub fn shutdown(&self) {
        info!("safe-mode monitor shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_mode::block_index::BlockIndex;
    use crate::safe_mode::types::BlockStatus;
    use crate::safe_mode::webhook::test_support::RecordingDispatcher;
    use serde_json::json;

    fn hash(n: u8) -> [u8; 32] {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    fn monitor(config: SafeModeConfig) -> (Monitor<BlockIndex>, RecordingDispatcher) {
        let (monitor, dispatcher, _alert) = monitor_with_alert(config);
        (monitor, dispatcher)
    }

    fn monitor_with_alert(
        config: SafeModeConfig,
    ) -> (
        Monitor<BlockIndex>,
        RecordingDispatcher,
        crate::safe_mode::alert::test_support::RecordingAlertSink,
    ) {
        let dispatcher = RecordingDispatcher::default();
        let alert = crate::safe_mode::alert::test_support::RecordingAlertSink::default();
        let monitor = Monitor::new(config, Arc::new(dispatcher.clone()), Arc::new(alert.clone()));
        (monitor, dispatcher, alert)
    }

    fn small_config() -> SafeModeConfig {
        SafeModeConfig {
            min_fork_length: 1,
            max_fork_distance: 1000,
            min_fork_height_difference: -1,
            webhook_address: Some("https://example.invalid/hook".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn fresh_monitor_reports_none() {
        let (monitor, _) = monitor(small_config());
        assert_eq!(monitor.current_level(), SafeModeLevel::None);
    }

    #[test]
    fn new_fork_tip_escalates_level_and_dispatches_webhook() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);

        let (monitor, dispatcher) = monitor(small_config());
        let guard = ChainGuard::assume_held();
        let f1 = idx.insert_block(hash(2), &genesis, 5, 1011, BlockStatus::valid(), 1);
        let level = monitor.check(&guard, &idx, Some(f1));

        assert_eq!(level, SafeModeLevel::Valid);
        assert_eq!(monitor.current_level(), SafeModeLevel::Valid);
        assert_eq!(dispatcher.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn repeated_check_with_no_change_does_not_redispatch() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);

        let (monitor, dispatcher) = monitor(small_config());
        let guard = ChainGuard::assume_held();
        let f1 = idx.insert_block(hash(2), &genesis, 5, 1011, BlockStatus::valid(), 1);
        monitor.check(&guard, &idx, Some(f1.clone()));
        assert_eq!(dispatcher.calls.lock().unwrap().len(), 1);

        let f2 = idx.insert_block(hash(3), &a1, 1, 1012, BlockStatus::valid(), 1);
        monitor.check(&guard, &idx, Some(f2));
        // f2 extends the current active tip rather than starting a new
        // fork, so the tracked fork set and level are unchanged and no
        // second dispatch fires.
        assert_eq!(dispatcher.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn clear_resets_to_none() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);

        let (monitor, _) = monitor(small_config());
        let guard = ChainGuard::assume_held();
        let f1 = idx.insert_block(hash(2), &genesis, 5, 1011, BlockStatus::valid(), 1);
        monitor.check(&guard, &idx, Some(f1));
        assert_eq!(monitor.current_level(), SafeModeLevel::Valid);

        monitor.clear(&guard);
        assert_eq!(monitor.current_level(), SafeModeLevel::None);
    }

    #[test]
    fn valid_transition_alerts_with_fork_parent_hashes() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);

        let (monitor, _dispatcher, alert) = monitor_with_alert(small_config());
        let guard = ChainGuard::assume_held();
        let f1 = idx.insert_block(hash(2), &genesis, 5, 1011, BlockStatus::valid(), 1);
        monitor.check(&guard, &idx, Some(f1));

        let messages = alert.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains(&hex::encode(genesis.block_hash())));
    }

    #[test]
    fn genesis_new_block_is_a_no_op() {
        let idx = BlockIndex::new();
        idx.insert_genesis(hash(0), 1000);

        let (monitor, dispatcher) = monitor(small_config());
        let guard = ChainGuard::assume_held();
        let genesis = idx.tip().unwrap();
        monitor.check(&guard, &idx, Some(genesis));

        assert_eq!(monitor.current_level(), SafeModeLevel::None);
        assert_eq!(dispatcher.calls.lock().unwrap().len(), 0);
    }

    #[test]
    fn reorg_rebuilds_and_demotes_old_active_chain_to_a_fork() {
        // After a reorg, the previously active tip can resurface as a
        // tracked fork if it still qualifies.
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);

        let (monitor, dispatcher) = monitor(small_config());
        let guard = ChainGuard::assume_held();

        // A competing branch arrives and, block for block, overtakes a1.
        // Kept close in work so a1 still clears the PoW floor once it's
        // demoted to a fork (small_config()'s gates are otherwise loose).
        let f1 = idx.insert_block(hash(2), &genesis, 1, 1011, BlockStatus::valid(), 1);
        let f2 = idx.insert_block(hash(3), &f1, 1, 1012, BlockStatus::valid(), 1);
        monitor.check(&guard, &idx, Some(f1.clone()));
        let dispatch_count_before_reorg = dispatcher.calls.lock().unwrap().len();

        // The reorg: the node switches its active chain to the f-branch.
        // The monitor is notified with no specific new block, the same way
        // it would be for any other unspecified change.
        idx.set_active_tip(&f2);
        monitor.check(&guard, &idx, None);

        // a1 is no longer on the active chain and still qualifies as a
        // fork under the small_config() gates, so it must now be tracked.
        let status = monitor.status(&guard, &idx);
        let forks = status["forks"].as_array().unwrap();
        let tracks_a1 = forks.iter().any(|fork| {
            fork["tips"]
                .as_array()
                .unwrap()
                .iter()
                .any(|t| t["hash"] == json!(hex::encode(a1.block_hash())))
        });
        assert!(tracks_a1, "old active tip should resurface as a fork after reorg");
        assert!(dispatcher.calls.lock().unwrap().len() > dispatch_count_before_reorg);
    }
}
