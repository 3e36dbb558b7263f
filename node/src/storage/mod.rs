// Storage module for SuperNova node
// 
// This module handles persistence of blockchain data and related functionality

pub mod database;
pub mod persistence;
pub mod backup;
pub mod checkpoint;
pub mod corruption;
pub mod integrity;
pub mod utxo_set;

pub use persistence::ChainState;
pub use database::StorageError;
pub use database::BlockchainDB;
pub use backup::{BackupManager, BackupOperation, RecoveryManager};
pub use checkpoint::{CheckpointManager, CheckpointConfig, CheckpointType, CheckpointInfo};
pub use corruption::{CorruptionError, CorruptionHandler};
pub use utxo_set::UtxoSet;