// SuperNova Lightning Network - Watchtower Implementation
//
// This file contains the implementation of the Lightning Network watchtower,
// which monitors channels for breaches and protects against channel theft.

use crate::types::transaction::{Transaction, TransactionInput, TransactionOutput};
use crate::lightning::channel::{ChannelId, ChannelState};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn, error};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Error types for watchtower operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),
    
    #[error("Invalid state: {0}")]
    InvalidState(String),
    
    #[error("Encryption error: {0}")]
    EncryptionError(String),
    
    #[error("Decryption error: {0}")]
    DecryptionError(String),
    
    #[error("Database error: {0}")]
    DatabaseError(String),
    
    #[error("Transaction error: {0}")]
    TransactionError(String),
    
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
    
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// State of a channel being monitored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorState {
    /// Channel is being actively monitored
    Active,
    
    /// Channel is pending registration
    Pending,
    
    /// Channel is closed
    Closed,
    
    /// Breach detected for channel
    Breached,
    
    /// Error state
    Error,
}

/// Encrypted channel state
#[derive(Debug, Clone)]
pub struct EncryptedChannelState {
    /// Encrypted data
    pub encrypted_data: Vec<u8>,
    
    /// Initialization vector
    pub iv: Vec<u8>,
    
    /// Authentication tag
    pub tag: Vec<u8>,
}

/// Information about a justice transaction
#[derive(Debug, Clone)]
pub struct JusticeTransaction {
    /// Channel ID
    pub channel_id: ChannelId,
    
    /// Commitment transaction ID
    pub commitment_txid: [u8; 32],
    
    /// Justice transaction template
    pub justice_tx: Transaction,
    
    /// Signature for justice transaction
    pub signature: Vec<u8>,
}

/// Breach remedy for a channel
#[derive(Debug, Clone)]
pub struct BreachRemedy {
    /// Channel ID
    pub channel_id: ChannelId,
    
    /// Breach transaction
    pub breach_tx: Transaction,
    
    /// Justice transaction
    pub justice_tx: Transaction,
    
    /// Time when breach was detected
    pub detection_time: u64,
}

/// Client session for a watchtower user
#[derive(Debug)]
pub struct WatchTowerSession {
    /// Client ID
    pub client_id: String,
    
    /// Monitored channels
    pub channels: HashSet<ChannelId>,
    
    /// Client public key
    pub public_key: Vec<u8>,
    
    /// Session creation time
    pub creation_time: u64,
    
    /// Last update time
    pub last_update: u64,
}

/// Data for a monitored channel
#[derive(Debug)]
pub struct MonitoredChannel {
    /// Channel ID
    pub channel_id: ChannelId,
    
    /// Current state
    pub state: MonitorState,
    
    /// Registered client ID
    pub client_id: String,
    
    /// Revoked transaction IDs
    pub revoked_txids: HashSet<[u8; 32]>,
    
    /// Justice transactions for each revoked transaction
    pub justice_txs: HashMap<[u8; 32], JusticeTransaction>,
    
    /// Encrypted channel state
    pub encrypted_state: EncryptedChannelState,
    
    /// Registration time
    pub registration_time: u64,
    
    /// Last update time
    pub last_update: u64,
}

/// Main channel monitor implementation
pub struct ChannelMonitor {
    /// Monitored channels
    channels: HashMap<ChannelId, MonitoredChannel>,
    
    /// Client sessions
    clients: HashMap<String, WatchTowerSession>,
    
    /// Breach transactions detected
    breach_txs: HashMap<[u8; 32], BreachRemedy>,
    
    /// Transaction filter for efficient breach detection
    tx_filter: HashSet<[u8; 32]>,
}

impl ChannelMonitor {
    /// Create a new channel monitor
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            clients: HashMap::new(),
            breach_txs: HashMap::new(),
            tx_filter: HashSet::new(),
        }
    }
    
    /// Register a client with the watchtower
    pub fn register_client(&mut self, client_id: &str, public_key: Vec<u8>) -> Result<(), WatchError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();
            
        let session = WatchTowerSession {
            client_id: client_id.to_string(),
            channels: HashSet::new(),
            public_key,
            creation_time: now,
            last_update: now,
        };
        
        self.clients.insert(client_id.to_string(), session);
        
        Ok(())
    }
    
    /// Register a channel for monitoring
    pub fn register_channel(
        &mut self,
        channel_id: ChannelId,
        client_id: &str,
        encrypted_state: EncryptedChannelState,
    ) -> Result<(), WatchError> {
        // Check if client exists
        if !self.clients.contains_key(client_id) {
            return Err(WatchError::AuthenticationError(
                format!("Client {} not registered", client_id)
            ));
        }
        
        // Check if channel already registered
        if self.channels.contains_key(&channel_id) {
            return Err(WatchError::InvalidState(
                format!("Channel {} already registered", channel_id)
            ));
        }
        
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();
            
        // Create monitored channel
        let monitored_channel = MonitoredChannel {
            channel_id: channel_id.clone(),
            state: MonitorState::Active,
            client_id: client_id.to_string(),
            revoked_txids: HashSet::new(),
            justice_txs: HashMap::new(),
            encrypted_state,
            registration_time: now,
            last_update: now,
        };
        
        // Register channel
        self.channels.insert(channel_id.clone(), monitored_channel);
        
        // Update client session
        if let Some(session) = self.clients.get_mut(client_id) {
            session.channels.insert(channel_id);
            session.last_update = now;
        }
        
        Ok(())
    }
    
    /// Unregister a channel from monitoring
    pub fn unregister_channel(&mut self, channel_id: &ChannelId) -> Result<(), WatchError> {
        // Find the channel
        let client_id = if let Some(channel) = self.channels.get(channel_id) {
            channel.client_id.clone()
        } else {
            return Err(WatchError::ChannelNotFound(
                format!("Channel {} not found", channel_id)
            ));
        };
        
        // Remove from client session
        if let Some(session) = self.clients.get_mut(&client_id) {
            session.channels.remove(channel_id);
            
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs();
                
            session.last_update = now;
        }
        
        // Remove channel from monitoring
        self.channels.remove(channel_id);
        
        // Remove any revoked transactions from filter
        if let Some(channel) = self.channels.get(channel_id) {
            for txid in &channel.revoked_txids {
                self.tx_filter.remove(txid);
            }
        }
        
        Ok(())
    }
    
    /// Add a revoked transaction to monitor
    pub fn add_revoked_transaction(
        &mut self,
        channel_id: &ChannelId,
        revoked_txid: [u8; 32],
        justice_tx: JusticeTransaction,
    ) -> Result<(), WatchError> {
        // Find the channel
        let channel = self.channels.get_mut(channel_id)
            .ok_or_else(|| WatchError::ChannelNotFound(
                format!("Channel {} not found", channel_id)
            ))?;
            
        // Add revoked transaction
        channel.revoked_txids.insert(revoked_txid);
        channel.justice_txs.insert(revoked_txid, justice_tx);
        
        // Add to transaction filter for quick lookup
        self.tx_filter.insert(revoked_txid);
        
        // Update last update time
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();
            
        channel.last_update = now;
        
        Ok(())
    }
    
    /// Process a new block to check for breaches
    pub fn process_block(&mut self, block: &Block) -> Vec<BreachRemedy> {
        let mut remedies = Vec::new();
        
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();
            
        // Check each transaction in the block for breaches
        for tx in block.get_transactions() {
            let txid = tx.hash();
            
            // Check if transaction is in our filter
            if self.tx_filter.contains(&txid) {
                // Find which channel this transaction belongs to
                for (channel_id, channel) in &self.channels {
                    if channel.revoked_txids.contains(&txid) {
                        // Breach detected!
                        if let Some(justice_tx) = channel.justice_txs.get(&txid) {
                            // Create breach remedy
                            let remedy = BreachRemedy {
                                channel_id: channel_id.clone(),
                                breach_tx: tx.clone(),
                                justice_tx: justice_tx.justice_tx.clone(),
                                detection_time: now,
                            };
                            
                            // Store breach
                            self.breach_txs.insert(txid, remedy.clone());
                            
                            // Add to remedies to return
                            remedies.push(remedy);
                            
                            // Mark channel as breached
                            if let Some(ch) = self.channels.get_mut(channel_id) {
                                ch.state = MonitorState::Breached;
                                ch.last_update = now;
                            }
                        }
                    }
                }
            }
        }
        
        remedies
    }
    
    /// Get information about a monitored channel
    pub fn get_channel_info(&self, channel_id: &ChannelId) -> Option<&MonitoredChannel> {
        self.channels.get(channel_id)
    }
    
    /// Get the number of monitored channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
    
    /// Get the number of clients
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
    
    /// Get detected breaches
    pub fn get_breaches(&self) -> Vec<&BreachRemedy> {
        self.breach_txs.values().collect()
    }
}

/// Main watchtower implementation
pub struct WatchTower {
    /// Channel monitor
    monitor: ChannelMonitor,
    
    /// Storage backend for persistent data
    storage: Option<Box<dyn WatchTowerStorage>>,
    
    /// Fee estimator for justice transactions
    fee_estimator: Option<Box<dyn FeeEstimator>>,
    
    /// Last sync time
    last_sync: u64,
}

/// Block structure for watchtower
pub struct Block {
    /// Block hash
    hash: [u8; 32],
    
    /// Block height
    height: u64,
    
    /// Block timestamp
    timestamp: u64,
    
    /// Transactions in the block
    transactions: Vec<Transaction>,
}

impl Block {
    /// Create a new block
    pub fn new(hash: [u8; 32], height: u64, timestamp: u64) -> Self {
        Self {
            hash,
            height,
            timestamp,
            transactions: Vec::new(),
        }
    }
    
    /// Add a transaction to the block
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }
    
    /// Get the transactions in the block
    pub fn get_transactions(&self) -> &[Transaction] {
        &self.transactions
    }
    
    /// Get the block hash
    pub fn hash(&self) -> [u8; 32] {
        self.hash
    }
    
    /// Get the block height
    pub fn height(&self) -> u64 {
        self.height
    }
    
    /// Get the block timestamp
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Trait for watchtower storage backend
pub trait WatchTowerStorage: Send + Sync {
    /// Save a monitored channel
    fn save_channel(&self, channel: &MonitoredChannel) -> Result<(), WatchError>;
    
    /// Load a monitored channel
    fn load_channel(&self, channel_id: &ChannelId) -> Result<MonitoredChannel, WatchError>;
    
    /// Delete a monitored channel
    fn delete_channel(&self, channel_id: &ChannelId) -> Result<(), WatchError>;
    
    /// Save a client session
    fn save_client(&self, client: &WatchTowerSession) -> Result<(), WatchError>;
    
    /// Load a client session
    fn load_client(&self, client_id: &str) -> Result<WatchTowerSession, WatchError>;
    
    /// Delete a client session
    fn delete_client(&self, client_id: &str) -> Result<(), WatchError>;
    
    /// Save a breach remedy
    fn save_breach(&self, breach: &BreachRemedy) -> Result<(), WatchError>;
    
    /// Load all breach remedies
    fn load_breaches(&self) -> Result<Vec<BreachRemedy>, WatchError>;
}

/// Trait for fee estimation
pub trait FeeEstimator: Send + Sync {
    /// Estimate fee rate in satoshis per kilobyte
    fn estimate_fee_rate(&self) -> u64;
    
    /// Estimate fee for a transaction
    fn estimate_fee(&self, tx: &Transaction) -> u64;
}

impl WatchTower {
    /// Create a new watchtower
    pub fn new() -> Self {
        Self {
            monitor: ChannelMonitor::new(),
            storage: None,
            fee_estimator: None,
            last_sync: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs(),
        }
    }
    
    /// Register a storage backend
    pub fn register_storage(&mut self, storage: Box<dyn WatchTowerStorage>) {
        self.storage = Some(storage);
    }
    
    /// Register a fee estimator
    pub fn register_fee_estimator(&mut self, fee_estimator: Box<dyn FeeEstimator>) {
        self.fee_estimator = Some(fee_estimator);
    }
    
    /// Process a new block
    pub fn process_block(&mut self, block: Block) -> Vec<BreachRemedy> {
        // Process block with monitor
        let remedies = self.monitor.process_block(&block);
        
        // Save breaches to storage if available
        if let Some(storage) = &self.storage {
            for remedy in &remedies {
                if let Err(e) = storage.save_breach(remedy) {
                    error!("Failed to save breach for channel {}: {}", remedy.channel_id, e);
                }
            }
        }
        
        // Update last sync time
        self.last_sync = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();
            
        remedies
    }
    
    /// Register a client
    pub fn register_client(&mut self, client_id: &str, public_key: Vec<u8>) -> Result<(), WatchError> {
        self.monitor.register_client(client_id, public_key)?;
        
        // Save client to storage if available
        if let Some(storage) = &self.storage {
            if let Some(client) = self.monitor.clients.get(client_id) {
                if let Err(e) = storage.save_client(client) {
                    error!("Failed to save client {}: {}", client_id, e);
                }
            }
        }
        
        Ok(())
    }
    
    /// Register a channel for monitoring
    pub fn register_channel(
        &mut self,
        channel_id: ChannelId,
        client_id: &str,
        encrypted_state: EncryptedChannelState,
    ) -> Result<(), WatchError> {
        self.monitor.register_channel(channel_id.clone(), client_id, encrypted_state)?;
        
        // Save channel to storage if available
        if let Some(storage) = &self.storage {
            if let Some(channel) = self.monitor.channels.get(&channel_id) {
                if let Err(e) = storage.save_channel(channel) {
                    error!("Failed to save channel {}: {}", channel_id, e);
                }
            }
        }
        
        Ok(())
    }
    
    /// Unregister a channel
    pub fn unregister_channel(&mut self, channel_id: &ChannelId) -> Result<(), WatchError> {
        self.monitor.unregister_channel(channel_id)?;
        
        // Delete channel from storage if available
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.delete_channel(channel_id) {
                error!("Failed to delete channel {}: {}", channel_id, e);
            }
        }
        
        Ok(())
    }
    
    /// Add a revoked transaction to monitor
    pub fn add_revoked_transaction(
        &mut self,
        channel_id: &ChannelId,
        revoked_txid: [u8; 32],
        justice_tx: JusticeTransaction,
    ) -> Result<(), WatchError> {
        self.monitor.add_revoked_transaction(channel_id, revoked_txid, justice_tx)?;
        
        // Save channel to storage if available
        if let Some(storage) = &self.storage {
            if let Some(channel) = self.monitor.channels.get(channel_id) {
                if let Err(e) = storage.save_channel(channel) {
                    error!("Failed to save channel {}: {}", channel_id, e);
                }
            }
        }
        
        Ok(())
    }
    
    /// Get the number of monitored channels
    pub fn channel_count(&self) -> usize {
        self.monitor.channel_count()
    }
    
    /// Get the number of clients
    pub fn client_count(&self) -> usize {
        self.monitor.client_count()
    }
    
    /// Get detected breaches
    pub fn get_breaches(&self) -> Vec<&BreachRemedy> {
        self.monitor.get_breaches()
    }
    
    /// Get last sync time
    pub fn last_sync_time(&self) -> u64 {
        self.last_sync
    }
} 