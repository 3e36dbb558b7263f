// Chain state module
// Re-exports from storage::chain_state for backwards compatibility

pub use crate::storage::chain_state::{
    ChainState, ChainStateConfig, ChainStateError, ChainStateResult,
};
