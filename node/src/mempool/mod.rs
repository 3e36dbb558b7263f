mod pool;
mod prioritization;

pub use pool::{TransactionPool, MempoolConfig, MempoolError};
pub use prioritization::{
    TransactionPrioritizer,
    PrioritizationConfig,
    PrioritizedTransaction,
};