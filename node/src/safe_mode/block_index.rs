//! In-memory block-index DAG used as the reference `ChainView` implementation.
//!
//! The production `storage::persistence::ChainState` is hash-keyed and
//! doesn't expose a parent-pointer DAG of every known tip; this module
//! supplies that structure, grounded in the same `Arc<RwLock<HashMap<..>>>`
//! shape used by `blockchain::invalidation::InvalidBlockTracker`. It is the
//! adapter that lets the safe-mode module be exercised end-to-end without
//! depending on the full storage stack.

use super::types::{BlockRef, BlockStatus, ChainView};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// One node of the block-index DAG. Never owns its parent; holds a
/// reference-counted handle to it instead, so a `BlockRef` stays a stable
/// handle rather than an owning tree node.
#[derive(Debug)]
pub struct IndexedBlock {
    pub height: u64,
    pub chain_work: u128,
    pub parent: Option<IndexedBlockRef>,
    pub block_hash: [u8; 32],
    pub block_time: u64,
    pub header_received_time: u64,
    pub status: BlockStatus,
    pub chain_tx: u64,
    pub ignored_for_safe_mode: RwLock<bool>,
}

/// A cheap, reference-counted handle into the DAG.
///
/// Equality and hashing are by `Arc` pointer identity: two nodes with
/// identical field values but inserted separately are distinct refs.
#[derive(Debug, Clone)]
pub struct IndexedBlockRef(pub Arc<IndexedBlock>);

impl PartialEq for IndexedBlockRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for IndexedBlockRef {}

impl std::hash::Hash for IndexedBlockRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl BlockRef for IndexedBlockRef {
    fn height(&self) -> u64 {
        self.0.height
    }
    fn chain_work(&self) -> u128 {
        self.0.chain_work
    }
    fn parent(&self) -> Option<Self> {
        self.0.parent.clone()
    }
    fn block_hash(&self) -> [u8; 32] {
        self.0.block_hash
    }
    fn block_time(&self) -> u64 {
        self.0.block_time
    }
    fn header_received_time(&self) -> u64 {
        self.0.header_received_time
    }
    fn status(&self) -> BlockStatus {
        self.0.status
    }
    fn chain_tx(&self) -> u64 {
        self.0.chain_tx
    }
    fn ignored_for_safe_mode(&self) -> bool {
        *self.0.ignored_for_safe_mode.read().unwrap()
    }
}

/// In-memory block-index DAG plus an explicit active-chain path.
pub struct BlockIndex {
    by_hash: RwLock<HashMap<[u8; 32], IndexedBlockRef>>,
    /// Active chain, genesis-first. The last element is the tip.
    active_chain: RwLock<Vec<IndexedBlockRef>>,
    /// Every known block that has no child yet (candidate fork tips, plus
    /// the active tip itself).
    leaves: RwLock<Vec<IndexedBlockRef>>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self {
            by_hash: RwLock::new(HashMap::new()),
            active_chain: RwLock::new(Vec::new()),
            leaves: RwLock::new(Vec::new()),
        }
    }

    /// Insert the genesis block and make it the active tip.
    pub fn insert_genesis(&self, block_hash: [u8; 32], block_time: u64) -> IndexedBlockRef {
        let node = IndexedBlockRef(Arc::new(IndexedBlock {
            height: 0,
            chain_work: 1,
            parent: None,
            block_hash,
            block_time,
            header_received_time: block_time,
            status: BlockStatus::valid(),
            chain_tx: 1,
            ignored_for_safe_mode: RwLock::new(false),
        }));
        self.by_hash.write().unwrap().insert(block_hash, node.clone());
        self.active_chain.write().unwrap().push(node.clone());
        self.leaves.write().unwrap().push(node.clone());
        node
    }

    /// Insert a new block as a child of `parent`, without touching the
    /// active chain. Returns the new node.
    pub fn insert_block(
        &self,
        block_hash: [u8; 32],
        parent: &IndexedBlockRef,
        work_delta: u128,
        block_time: u64,
        status: BlockStatus,
        chain_tx: u64,
    ) -> IndexedBlockRef {
        let node = IndexedBlockRef(Arc::new(IndexedBlock {
            height: parent.height() + 1,
            chain_work: parent.chain_work() + work_delta,
            parent: Some(parent.clone()),
            block_hash,
            block_time,
            header_received_time: block_time,
            status,
            chain_tx,
            ignored_for_safe_mode: RwLock::new(false),
        }));
        self.by_hash.write().unwrap().insert(block_hash, node.clone());

        let mut leaves = self.leaves.write().unwrap();
        leaves.retain(|l| l != parent);
        leaves.push(node.clone());

        node
    }

    /// Switch the active chain to end at `new_tip`, walking parents until a
    /// block already on the stored active chain is found.
    pub fn set_active_tip(&self, new_tip: &IndexedBlockRef) {
        let mut path = vec![new_tip.clone()];
        let mut walk = new_tip.clone();
        while let Some(p) = walk.parent() {
            path.push(p.clone());
            walk = p;
        }
        path.reverse();
        *self.active_chain.write().unwrap() = path;
    }

    pub fn get(&self, hash: &[u8; 32]) -> Option<IndexedBlockRef> {
        self.by_hash.read().unwrap().get(hash).cloned()
    }

    pub fn mark_ignored(&self, block: &IndexedBlockRef, ignored: bool) {
        *block.0.ignored_for_safe_mode.write().unwrap() = ignored;
    }
}

impl Default for BlockIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainView for BlockIndex {
    type Ref = IndexedBlockRef;

    fn tip(&self) -> Option<Self::Ref> {
        self.active_chain.read().unwrap().last().cloned()
    }

    fn contains(&self, block: &Self::Ref) -> bool {
        self.active_chain.read().unwrap().iter().any(|b| b == block)
    }

    fn next(&self, block: &Self::Ref) -> Option<Self::Ref> {
        let chain = self.active_chain.read().unwrap();
        let pos = chain.iter().position(|b| b == block)?;
        chain.get(pos + 1).cloned()
    }

    fn fork_tips(&self) -> Vec<Self::Ref> {
        let active_tip = self.tip();
        self.leaves
            .read()
            .unwrap()
            .iter()
            .filter(|leaf| Some((*leaf).clone()) != active_tip)
            .cloned()
            .collect()
    }

    fn block_proof(&self, _block: &Self::Ref) -> u128 {
        // Constant per-block proof in this reference adapter: blocks carry
        // their own chain_work delta directly rather than a difficulty
        // target the monitor would need to convert.
        1
    }
}
