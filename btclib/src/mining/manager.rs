use std::collections::HashMap;
use std::sync::{Arc, RwLock, Mutex, atomic::{AtomicBool, AtomicU64, Ordering}};
use std::time::{Duration, SystemTime, UNIX_EPOCH, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn, error, debug};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::mining::{MiningConfig, BlockTemplate, MiningWorker, MiningMetrics};
use crate::types::{Block, Transaction};
use crate::mempool::TransactionPool;
use crate::environmental::EmissionsTracker;
use crate::crypto::quantum::QuantumScheme;

/// Mining Manager - Central coordinator for mining operations
pub struct MiningManager {
    /// Mining configuration
    config: MiningConfig,
    
    /// Current mining status
    is_mining: Arc<AtomicBool>,
    
    /// Number of active mining threads
    mining_threads: Arc<AtomicU64>,
    
    /// Current hashrate (hashes per second)
    current_hashrate: Arc<AtomicU64>,
    
    /// Total blocks mined
    blocks_mined: Arc<AtomicU64>,
    
    /// Mining workers
    workers: Arc<RwLock<Vec<Arc<MiningWorker>>>>,
    
    /// Current block template
    current_template: Arc<RwLock<Option<BlockTemplate>>>,
    
    /// Template creation time
    template_created: Arc<RwLock<Option<Instant>>>,
    
    /// Mining statistics
    stats: Arc<RwLock<MiningStats>>,
    
    /// Transaction pool for getting transactions
    mempool: Arc<TransactionPool>,
    
    /// Environmental tracker for green mining
    environmental_tracker: Option<Arc<EmissionsTracker>>,
    
    /// Block submission channel
    block_sender: mpsc::UnboundedSender<Block>,
    
    /// Mining start time
    start_time: Arc<RwLock<Option<Instant>>>,
    
    /// Difficulty target
    current_target: Arc<AtomicU64>,
    
    /// Network hashrate estimate
    network_hashrate: Arc<AtomicU64>,
    
    /// Fee rates for different priorities
    fee_rates: Arc<RwLock<FeeTiers>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningStats {
    /// Total hashes computed
    pub total_hashes: u64,
    /// Blocks found
    pub blocks_found: u64,
    /// Mining uptime in seconds
    pub uptime_seconds: u64,
    /// Average hashrate over last hour
    pub avg_hashrate_1h: f64,
    /// Current difficulty
    pub current_difficulty: f64,
    /// Estimated time to next block
    pub estimated_time_to_block: f64,
    /// Power consumption estimate (watts)
    pub power_consumption_watts: f64,
    /// Energy efficiency (J/TH)
    pub energy_efficiency: f64,
    /// Carbon emissions (gCO2/hash)
    pub carbon_emissions_per_hash: f64,
    /// Renewable energy percentage
    pub renewable_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeTiers {
    /// High priority fee rate (satoshis per byte)
    pub high_priority: f64,
    /// Medium priority fee rate (satoshis per byte)
    pub medium_priority: f64,
    /// Low priority fee rate (satoshis per byte)
    pub low_priority: f64,
    /// Minimum fee rate (satoshis per byte)
    pub minimum: f64,
}

impl Default for FeeTiers {
    fn default() -> Self {
        Self {
            high_priority: 50.0,
            medium_priority: 25.0,
            low_priority: 10.0,
            minimum: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningInfo {
    /// Whether the node is mining
    pub is_mining: bool,
    /// Number of mining threads
    pub mining_threads: usize,
    /// Current hashrate in hashes per second
    pub hashrate: u64,
    /// Network difficulty
    pub difficulty: f64,
    /// Network hashrate estimate
    pub network_hashrate: u64,
    /// Current block height
    pub current_height: u64,
    /// Time since last block
    pub seconds_since_last_block: u64,
    /// Transaction fee rates
    pub fee_rates: FeeTiers,
    /// Environmental impact
    pub environmental_impact: Option<EnvironmentalImpact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    /// Power consumption in watts
    pub power_consumption_watts: f64,
    /// Carbon emissions in gCO2/hour
    pub carbon_emissions_per_hour: f64,
    /// Renewable energy percentage
    pub renewable_percentage: f64,
    /// Energy efficiency in J/TH
    pub energy_efficiency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningTemplate {
    /// Block version
    pub version: u32,
    /// Previous block hash
    pub prev_hash: String,
    /// Block timestamp
    pub timestamp: u64,
    /// Block height
    pub height: u64,
    /// Block difficulty target
    pub target: u32,
    /// Merkle root
    pub merkle_root: String,
    /// Transactions
    pub transactions: Vec<TemplateTransaction>,
    /// Total fees
    pub total_fees: u64,
    /// Block size in bytes
    pub size: usize,
    /// Block weight
    pub weight: usize,
    /// Estimated time to mine block
    pub estimated_time_to_mine: f64,
    /// Environmental data
    pub environmental_data: Option<TemplateEnvironmentalData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateTransaction {
    /// Transaction ID
    pub txid: String,
    /// Transaction data in hex
    pub data: String,
    /// Transaction fee
    pub fee: u64,
    /// Transaction weight
    pub weight: usize,
    /// Ancestor fee (for sorting)
    pub ancestor_fee: u64,
    /// Ancestor weight (for sorting)
    pub ancestor_weight: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEnvironmentalData {
    /// Estimated energy consumption for this block
    pub estimated_energy_kwh: f64,
    /// Estimated carbon emissions
    pub estimated_carbon_grams: f64,
    /// Green mining bonus
    pub green_mining_bonus: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitBlockResponse {
    /// Whether the block was accepted
    pub accepted: bool,
    /// Block hash
    pub block_hash: String,
    /// Rejection reason (if any)
    pub reject_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningStatus {
    /// Current mining state
    pub state: String,
    /// Number of active workers
    pub active_workers: usize,
    /// Current template age in seconds
    pub template_age_seconds: u64,
    /// Hashrate over different time periods
    pub hashrate_1m: u64,
    pub hashrate_5m: u64,
    pub hashrate_15m: u64,
    /// Hardware temperature (if available)
    pub hardware_temperature: Option<f64>,
    /// Fan speed percentage (if available)
    pub fan_speed_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningConfiguration {
    /// Number of mining threads
    pub threads: Option<u32>,
    /// Mining intensity (0.0 to 1.0)
    pub intensity: Option<f64>,
    /// Target temperature (Celsius)
    pub target_temperature: Option<f64>,
    /// Enable green mining features
    pub green_mining_enabled: Option<bool>,
    /// Quantum-resistant mining
    pub quantum_resistant: Option<bool>,
    /// Custom mining algorithm parameters
    pub algorithm_params: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Error, Debug)]
pub enum MiningError {
    #[error("Mining not active")]
    NotMining,
    #[error("Invalid block template: {0}")]
    InvalidTemplate(String),
    #[error("Block submission failed: {0}")]
    SubmissionFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Hardware error: {0}")]
    HardwareError(String),
    #[error("Environmental error: {0}")]
    EnvironmentalError(String),
    #[error("Blockchain error: {0}")]
    BlockchainError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MiningManager {
    /// Create a new mining manager
    pub fn new(
        config: MiningConfig,
        mempool: Arc<TransactionPool>,
        environmental_tracker: Option<Arc<EmissionsTracker>>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Block>), MiningError> {
        let (block_sender, block_receiver) = mpsc::unbounded_channel();
        
        let manager = Self {
            config,
            is_mining: Arc::new(AtomicBool::new(false)),
            mining_threads: Arc::new(AtomicU64::new(0)),
            current_hashrate: Arc::new(AtomicU64::new(0)),
            blocks_mined: Arc::new(AtomicU64::new(0)),
            workers: Arc::new(RwLock::new(Vec::new())),
            current_template: Arc::new(RwLock::new(None)),
            template_created: Arc::new(RwLock::new(None)),
            stats: Arc::new(RwLock::new(MiningStats::default())),
            mempool,
            environmental_tracker,
            block_sender,
            start_time: Arc::new(RwLock::new(None)),
            current_target: Arc::new(AtomicU64::new(0x1d00ffff)), // Default difficulty
            network_hashrate: Arc::new(AtomicU64::new(100_000_000_000_000)), // 100 TH/s default
            fee_rates: Arc::new(RwLock::new(FeeTiers::default())),
        };
        
        Ok((manager, block_receiver))
    }
    
    /// Get mining information
    pub fn get_mining_info(&self) -> Result<MiningInfo, MiningError> {
        let is_mining = self.is_mining.load(Ordering::Relaxed);
        let mining_threads = self.mining_threads.load(Ordering::Relaxed) as usize;
        let hashrate = self.current_hashrate.load(Ordering::Relaxed);
        let network_hashrate = self.network_hashrate.load(Ordering::Relaxed);
        let current_target = self.current_target.load(Ordering::Relaxed);
        
        // Calculate difficulty from target
        let difficulty = self.target_to_difficulty(current_target as u32);
        
        // Calculate time since last block (simplified)
        let seconds_since_last_block = 600; // Default 10 minutes
        
        let fee_rates = self.fee_rates.read().unwrap().clone();
        
        // Get environmental impact if tracker is available
        let environmental_impact = if let Some(tracker) = &self.environmental_tracker {
            Some(EnvironmentalImpact {
                power_consumption_watts: self.estimate_power_consumption(hashrate),
                carbon_emissions_per_hour: self.estimate_carbon_emissions(hashrate),
                renewable_percentage: tracker.calculate_network_renewable_percentage(),
                energy_efficiency: self.config.energy_efficiency_j_th,
            })
        } else {
            None
        };
        
        Ok(MiningInfo {
            is_mining,
            mining_threads,
            hashrate,
            difficulty,
            network_hashrate,
            current_height: 0, // TODO: Get from chain state
            seconds_since_last_block,
            fee_rates,
            environmental_impact,
        })
    }
    
    /// Get mining template
    pub fn get_mining_template(&self, capabilities: &str, max_transactions: Option<u32>) -> Result<MiningTemplate, MiningError> {
        info!("Creating mining template with capabilities: {}", capabilities);
        
        // Get transactions from mempool
        let max_tx = max_transactions.unwrap_or(5000) as usize;
        let transactions = self.mempool.get_prioritized_transactions(max_tx);
        
        // Convert transactions to template format
        let template_transactions: Vec<TemplateTransaction> = transactions.iter().map(|tx| {
            let txid = hex::encode(tx.hash());
            let data = hex::encode(bincode::serialize(tx).unwrap_or_default());
            let fee = self.mempool.get_transaction_fee(&txid).unwrap_or(0);
            let weight = tx.calculate_size();
            
            TemplateTransaction {
                txid,
                data,
                fee,
                weight,
                ancestor_fee: fee, // Simplified
                ancestor_weight: weight,
            }
        }).collect();
        
        let total_fees: u64 = template_transactions.iter().map(|tx| tx.fee).sum();
        let total_size: usize = template_transactions.iter().map(|tx| tx.weight).sum();
        let total_weight = total_size; // Simplified weight calculation
        
        // Calculate estimated time to mine
        let current_hashrate = self.current_hashrate.load(Ordering::Relaxed);
        let current_target = self.current_target.load(Ordering::Relaxed);
        let estimated_time = if current_hashrate > 0 {
            (current_target as f64) / (current_hashrate as f64)
        } else {
            600.0 // Default 10 minutes
        };
        
        // Environmental data
        let environmental_data = if let Some(tracker) = &self.environmental_tracker {
            Some(TemplateEnvironmentalData {
                estimated_energy_kwh: self.estimate_block_energy_consumption(),
                estimated_carbon_grams: self.estimate_block_carbon_emissions(),
                green_mining_bonus: self.calculate_green_mining_bonus(),
            })
        } else {
            None
        };
        
        let template = MiningTemplate {
            version: 1,
            prev_hash: "0000000000000000000000000000000000000000000000000000000000000000".to_string(), // TODO: Get from chain
            timestamp: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs(),
            height: 0, // TODO: Get from chain state
            target: current_target as u32,
            merkle_root: self.calculate_merkle_root(&template_transactions),
            transactions: template_transactions,
            total_fees,
            size: total_size,
            weight: total_weight,
            estimated_time_to_mine: estimated_time,
            environmental_data,
        };
        
        // Store template
        {
            let mut current_template = self.current_template.write().unwrap();
            *current_template = Some(BlockTemplate::from_mining_template(&template));
            
            let mut template_created = self.template_created.write().unwrap();
            *template_created = Some(Instant::now());
        }
        
        Ok(template)
    }
    
    /// Submit a mined block
    pub fn submit_block(&self, block_data: &[u8]) -> Result<SubmitBlockResponse, MiningError> {
        info!("Submitting mined block ({} bytes)", block_data.len());
        
        // Deserialize block
        let block: Block = bincode::deserialize(block_data)
            .map_err(|e| MiningError::InvalidTemplate(format!("Failed to deserialize block: {}", e)))?;
        
        // Validate block
        if !self.validate_submitted_block(&block) {
            return Ok(SubmitBlockResponse {
                accepted: false,
                block_hash: hex::encode(block.hash()),
                reject_reason: Some("Block validation failed".to_string()),
            });
        }
        
        // Check proof of work
        if !self.verify_proof_of_work(&block) {
            return Ok(SubmitBlockResponse {
                accepted: false,
                block_hash: hex::encode(block.hash()),
                reject_reason: Some("Invalid proof of work".to_string()),
            });
        }
        
        // Submit block to network
        if let Err(e) = self.block_sender.send(block.clone()) {
            return Err(MiningError::SubmissionFailed(format!("Failed to submit block: {}", e)));
        }
        
        // Update statistics
        self.blocks_mined.fetch_add(1, Ordering::Relaxed);
        
        // Update environmental tracking
        if let Some(tracker) = &self.environmental_tracker {
            // TODO: Add method to record block mining in EmissionsTracker
            // tracker.record_block_mined(&block);
        }
        
        info!("Block submitted successfully: {}", hex::encode(block.hash()));
        
        Ok(SubmitBlockResponse {
            accepted: true,
            block_hash: hex::encode(block.hash()),
            reject_reason: None,
        })
    }
    
    /// Get mining statistics
    pub fn get_mining_stats(&self, period: u64) -> Result<MiningStats, MiningError> {
        let stats = self.stats.read().unwrap();
        
        // Calculate period-specific statistics
        let uptime = if let Some(start_time) = *self.start_time.read().unwrap() {
            start_time.elapsed().as_secs().min(period)
        } else {
            0
        };
        
        let current_hashrate = self.current_hashrate.load(Ordering::Relaxed);
        let blocks_found = self.blocks_mined.load(Ordering::Relaxed);
        
        // Environmental calculations
        let (carbon_emissions_per_hash, renewable_percentage) = if let Some(tracker) = &self.environmental_tracker {
            (
                0.0, // TODO: Calculate carbon intensity per hash from tracker data
                tracker.calculate_network_renewable_percentage(),
            )
        } else {
            (0.0, 0.0)
        };
        
        Ok(MiningStats {
            total_hashes: stats.total_hashes,
            blocks_found,
            uptime_seconds: uptime,
            avg_hashrate_1h: current_hashrate as f64,
            current_difficulty: self.target_to_difficulty(self.current_target.load(Ordering::Relaxed) as u32),
            estimated_time_to_block: self.estimate_time_to_block(),
            power_consumption_watts: self.estimate_power_consumption(current_hashrate),
            energy_efficiency: self.config.energy_efficiency_j_th,
            carbon_emissions_per_hash,
            renewable_percentage,
        })
    }
    
    /// Get mining status
    pub fn get_mining_status(&self) -> Result<MiningStatus, MiningError> {
        let is_mining = self.is_mining.load(Ordering::Relaxed);
        let workers = self.workers.read().unwrap();
        let active_workers = workers.len();
        
        let template_age_seconds = if let Some(created) = *self.template_created.read().unwrap() {
            created.elapsed().as_secs()
        } else {
            0
        };
        
        let current_hashrate = self.current_hashrate.load(Ordering::Relaxed);
        
        Ok(MiningStatus {
            state: if is_mining { "MINING".to_string() } else { "IDLE".to_string() },
            active_workers,
            template_age_seconds,
            hashrate_1m: current_hashrate,
            hashrate_5m: current_hashrate, // Simplified
            hashrate_15m: current_hashrate, // Simplified
            hardware_temperature: self.get_hardware_temperature(),
            fan_speed_percentage: self.get_fan_speed(),
        })
    }
    
    /// Start mining
    pub fn start_mining(&self, threads: Option<u32>) -> Result<(), MiningError> {
        if self.is_mining.load(Ordering::Relaxed) {
            return Ok(()); // Already mining
        }
        
        let thread_count = threads.unwrap_or(self.config.mining_threads);
        
        info!("Starting mining with {} threads", thread_count);
        
        // Create mining workers
        let mut workers = self.workers.write().unwrap();
        workers.clear();
        
        for i in 0..thread_count {
            let worker = Arc::new(MiningWorker::new(
                i as usize,
                self.config.clone(),
                self.mempool.clone(),
                self.block_sender.clone(),
            ));
            
            workers.push(worker);
        }
        
        // Start workers
        for worker in workers.iter() {
            worker.start();
        }
        
        // Update state
        self.is_mining.store(true, Ordering::Relaxed);
        self.mining_threads.store(thread_count as u64, Ordering::Relaxed);
        
        let mut start_time = self.start_time.write().unwrap();
        *start_time = Some(Instant::now());
        
        info!("Mining started successfully with {} threads", thread_count);
        
        Ok(())
    }
    
    /// Stop mining
    pub fn stop_mining(&self) -> Result<(), MiningError> {
        if !self.is_mining.load(Ordering::Relaxed) {
            return Ok(()); // Not mining
        }
        
        info!("Stopping mining");
        
        // Stop all workers
        let workers = self.workers.read().unwrap();
        for worker in workers.iter() {
            worker.stop();
        }
        
        // Update state
        self.is_mining.store(false, Ordering::Relaxed);
        self.mining_threads.store(0, Ordering::Relaxed);
        self.current_hashrate.store(0, Ordering::Relaxed);
        
        info!("Mining stopped");
        
        Ok(())
    }
    
    /// Get mining configuration
    pub fn get_mining_config(&self) -> Result<MiningConfiguration, MiningError> {
        Ok(MiningConfiguration {
            threads: Some(self.config.mining_threads),
            intensity: Some(self.config.mining_intensity),
            target_temperature: self.config.target_temperature,
            green_mining_enabled: Some(self.config.green_mining_enabled),
            quantum_resistant: Some(self.config.quantum_resistant),
            algorithm_params: Some(self.config.algorithm_params.clone()),
        })
    }
    
    /// Update mining configuration
    pub fn update_mining_config(&self, config: MiningConfiguration) -> Result<MiningConfiguration, MiningError> {
        info!("Updating mining configuration");
        
        // Validate configuration
        if let Some(threads) = config.threads {
            if threads == 0 || threads > 256 {
                return Err(MiningError::ConfigError("Invalid thread count".to_string()));
            }
        }
        
        if let Some(intensity) = config.intensity {
            if intensity < 0.0 || intensity > 1.0 {
                return Err(MiningError::ConfigError("Intensity must be between 0.0 and 1.0".to_string()));
            }
        }
        
        // Apply configuration changes
        // Note: In a real implementation, this would update the actual config
        // and potentially restart mining with new parameters
        
        info!("Mining configuration updated successfully");
        
        // Return the updated configuration
        self.get_mining_config()
    }
    
    // Helper methods
    
    fn target_to_difficulty(&self, target: u32) -> f64 {
        // Simplified difficulty calculation
        let max_target = 0x1d00ffff_u64;
        max_target as f64 / target as f64
    }
    
    fn estimate_power_consumption(&self, hashrate: u64) -> f64 {
        // Estimate power consumption based on hashrate and efficiency
        let th_per_second = hashrate as f64 / 1e12;
        th_per_second * self.config.energy_efficiency_j_th
    }
    
    fn estimate_carbon_emissions(&self, hashrate: u64) -> f64 {
        let power_watts = self.estimate_power_consumption(hashrate);
        let power_kwh = power_watts / 1000.0; // Convert to kWh
        
        // Use environmental tracker if available
        if let Some(tracker) = &self.environmental_tracker {
            power_kwh * tracker.get_carbon_intensity_kwh()
        } else {
            power_kwh * 0.5 // Default 500g CO2/kWh
        }
    }
    
    fn estimate_time_to_block(&self) -> f64 {
        let current_hashrate = self.current_hashrate.load(Ordering::Relaxed);
        let current_target = self.current_target.load(Ordering::Relaxed);
        
        if current_hashrate > 0 {
            (current_target as f64) / (current_hashrate as f64)
        } else {
            600.0 // Default 10 minutes
        }
    }
    
    fn estimate_block_energy_consumption(&self) -> f64 {
        let estimated_time = self.estimate_time_to_block();
        let current_hashrate = self.current_hashrate.load(Ordering::Relaxed);
        let power_watts = self.estimate_power_consumption(current_hashrate);
        
        (power_watts * estimated_time) / 3600.0 // Convert to kWh
    }
    
    fn estimate_block_carbon_emissions(&self) -> f64 {
        let energy_kwh = self.estimate_block_energy_consumption();
        
        if let Some(tracker) = &self.environmental_tracker {
            energy_kwh * tracker.get_carbon_intensity_kwh() * 1000.0 // Convert to grams
        } else {
            energy_kwh * 500.0 // Default 500g CO2/kWh
        }
    }
    
    fn calculate_green_mining_bonus(&self) -> u64 {
        if let Some(tracker) = &self.environmental_tracker {
            let renewable_percentage = tracker.get_renewable_percentage();
            (renewable_percentage * 1000.0) as u64 // Bonus in satoshis
        } else {
            0
        }
    }
    
    fn calculate_merkle_root(&self, transactions: &[TemplateTransaction]) -> String {
        // Simplified merkle root calculation
        if transactions.is_empty() {
            return "0000000000000000000000000000000000000000000000000000000000000000".to_string();
        }
        
        // In a real implementation, this would calculate the actual merkle root
        let mut hasher = sha2::Sha256::new();
        for tx in transactions {
            hasher.update(tx.txid.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
    
    fn validate_submitted_block(&self, block: &Block) -> bool {
        // Basic block validation
        if block.transactions().is_empty() {
            return false;
        }
        
        // Check block size
        let block_size = bincode::serialize(block).unwrap_or_default().len();
        if block_size > 1_000_000 {
            return false;
        }
        
        // Additional validation would go here
        true
    }
    
    fn verify_proof_of_work(&self, block: &Block) -> bool {
        // Simplified proof of work verification
        let block_hash = block.hash();
        let target = self.current_target.load(Ordering::Relaxed) as u32;
        
        // Check if hash meets difficulty target
        let hash_value = u32::from_be_bytes([
            block_hash[0], block_hash[1], block_hash[2], block_hash[3]
        ]);
        
        hash_value <= target
    }
    
    fn get_hardware_temperature(&self) -> Option<f64> {
        // In a real implementation, this would read from hardware sensors
        None
    }
    
    fn get_fan_speed(&self) -> Option<f64> {
        // In a real implementation, this would read from hardware sensors
        None
    }
    
    /// Update hashrate statistics
    pub fn update_hashrate(&self, hashrate: u64) {
        self.current_hashrate.store(hashrate, Ordering::Relaxed);
        
        // Update statistics
        let mut stats = self.stats.write().unwrap();
        stats.total_hashes += hashrate;
        stats.avg_hashrate_1h = hashrate as f64;
    }
    
    /// Update network hashrate estimate
    pub fn update_network_hashrate(&self, network_hashrate: u64) {
        self.network_hashrate.store(network_hashrate, Ordering::Relaxed);
    }
    
    /// Update difficulty target
    pub fn update_difficulty_target(&self, target: u32) {
        self.current_target.store(target as u64, Ordering::Relaxed);
    }
    
    /// Update fee rates
    pub fn update_fee_rates(&self, fee_rates: FeeTiers) {
        let mut current_rates = self.fee_rates.write().unwrap();
        *current_rates = fee_rates;
    }
    
    /// Create a mining template
    pub fn create_mining_template(&self) -> Result<BlockTemplate, MiningError> {
        info!("Creating mining template");
        
        // Get current blockchain state
        let best_block_hash = self.blockchain.get_best_block_hash()
            .map_err(|e| MiningError::BlockchainError(e.to_string()))?;
        let best_block_height = self.blockchain.get_block_height(&best_block_hash)
            .map_err(|e| MiningError::BlockchainError(e.to_string()))?;
        
        // Calculate next block height
        let next_height = best_block_height + 1;
        
        // Get current difficulty target
        let difficulty_target = self.blockchain.get_current_difficulty()
            .map_err(|e| MiningError::BlockchainError(e.to_string()))?;
        
        // Select transactions from mempool
        let selected_transactions = self.select_transactions_for_block()?;
        
        // Calculate total fees
        let total_fees: u64 = selected_transactions.iter()
            .map(|tx| self.mempool.get_transaction_fee(tx).unwrap_or(0))
            .sum();
        
        // Calculate block reward (including fees)
        let base_reward = self.calculate_block_reward(next_height);
        let total_reward = base_reward + total_fees;
        
        // Create coinbase transaction
        let coinbase_tx = self.create_coinbase_transaction(total_reward, next_height)?;
        
        // Combine coinbase with selected transactions
        let mut all_transactions = vec![coinbase_tx];
        all_transactions.extend(selected_transactions);
        
        // Calculate merkle root
        let merkle_root = self.calculate_merkle_root(&all_transactions)?;
        
        // Get current timestamp
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as u32;
        
        // Calculate environmental impact
        let renewable_percentage = self.emissions_tracker.calculate_network_renewable_percentage();
        let estimated_emissions = self.estimate_block_emissions(&all_transactions);
        
        // Create block template
        let template = BlockTemplate {
            version: 1,
            previous_block_hash: best_block_hash,
            merkle_root,
            timestamp,
            difficulty_target,
            nonce: 0, // Will be set by miner
            height: next_height,
            transactions: all_transactions,
            total_fees,
            block_reward: base_reward,
            renewable_energy_percentage: renewable_percentage,
            carbon_offset_credits: estimated_emissions,
            quantum_signature: None, // Will be added during mining
        };
        
        info!("Created mining template for block {} with {} transactions, {} total fees", 
              next_height, template.transactions.len(), total_fees);
        
        Ok(template)
    }
    
    /// Select transactions from mempool for inclusion in block
    fn select_transactions_for_block(&self) -> Result<Vec<Transaction>, MiningError> {
        let mut selected = Vec::new();
        let mut total_size = 0u64;
        let mut total_fees = 0u64;
        
        // Get all transactions from mempool sorted by fee rate
        let mut candidates = self.mempool.get_all_transactions();
        
        // Sort by fee rate (descending) for optimal fee collection
        candidates.sort_by(|a, b| {
            let fee_rate_a = self.mempool.get_transaction_fee(a).unwrap_or(0) as f64 / 
                            self.mempool.size_in_bytes(a).unwrap_or(1) as f64;
            let fee_rate_b = self.mempool.get_transaction_fee(b).unwrap_or(0) as f64 / 
                            self.mempool.size_in_bytes(b).unwrap_or(1) as f64;
            fee_rate_b.partial_cmp(&fee_rate_a).unwrap_or(std::cmp::Ordering::Equal)
        });
        
        // Select transactions up to block size limit
        const MAX_BLOCK_SIZE: u64 = 1_000_000; // 1MB block size limit
        
        for tx in candidates {
            let tx_size = self.mempool.size_in_bytes(&tx).unwrap_or(250); // Default size estimate
            let tx_fee = self.mempool.get_transaction_fee(&tx).unwrap_or(0);
            
            // Check if adding this transaction would exceed block size limit
            if total_size + tx_size > MAX_BLOCK_SIZE {
                continue;
            }
            
            // Validate transaction
            if let Err(e) = self.blockchain.validate_transaction(&tx) {
                warn!("Skipping invalid transaction: {}", e);
                continue;
            }
            
            // Add transaction to block
            selected.push(tx);
            total_size += tx_size;
            total_fees += tx_fee;
            
            // Stop if we have enough transactions
            if selected.len() >= 1000 { // Max transactions per block
                break;
            }
        }
        
        info!("Selected {} transactions with total fees {} and size {} bytes", 
              selected.len(), total_fees, total_size);
        
        Ok(selected)
    }
    
    /// Create coinbase transaction for block reward
    fn create_coinbase_transaction(&self, reward: u64, height: u64) -> Result<Transaction, MiningError> {
        use crate::types::transaction::{TransactionInput, TransactionOutput};
        
        // Create coinbase input (no previous output)
        let coinbase_input = TransactionInput {
            previous_output_hash: [0u8; 32], // Null hash for coinbase
            previous_output_index: 0xFFFFFFFF, // Special index for coinbase
            script_sig: format!("Block height: {}", height).into_bytes(),
            sequence: 0xFFFFFFFF,
        };
        
        // Create output to miner's address
        let miner_output = TransactionOutput {
            value: reward,
            script_pubkey: self.miner_address.clone().into_bytes(),
        };
        
        // Create transaction
        let coinbase_tx = Transaction {
            version: 1,
            inputs: vec![coinbase_input],
            outputs: vec![miner_output],
            lock_time: 0,
        };
        
        Ok(coinbase_tx)
    }
    
    /// Calculate merkle root of transactions
    fn calculate_merkle_root(&self, transactions: &[Transaction]) -> Result<[u8; 32], MiningError> {
        if transactions.is_empty() {
            return Ok([0u8; 32]);
        }
        
        // Calculate transaction hashes
        let mut hashes: Vec<[u8; 32]> = transactions.iter()
            .map(|tx| {
                let serialized = bincode::serialize(tx)
                    .map_err(|e| MiningError::SerializationError(e.to_string()))?;
                let mut hasher = Sha256::new();
                hasher.update(&serialized);
                let result = hasher.finalize();
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&result);
                Ok(hash)
            })
            .collect::<Result<Vec<_>, MiningError>>()?;
        
        // Build merkle tree
        while hashes.len() > 1 {
            let mut next_level = Vec::new();
            
            for chunk in hashes.chunks(2) {
                let mut hasher = Sha256::new();
                hasher.update(&chunk[0]);
                
                // If odd number of hashes, duplicate the last one
                if chunk.len() == 2 {
                    hasher.update(&chunk[1]);
                } else {
                    hasher.update(&chunk[0]);
                }
                
                let result = hasher.finalize();
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&result);
                next_level.push(hash);
            }
            
            hashes = next_level;
        }
        
        Ok(hashes[0])
    }
    
    /// Calculate block reward based on height
    fn calculate_block_reward(&self, height: u64) -> u64 {
        // Supernova block reward schedule
        const INITIAL_REWARD: u64 = 50_000_000; // 50 NOVA (in satoshis)
        const HALVING_INTERVAL: u64 = 210_000; // Blocks between halvings
        
        let halvings = height / HALVING_INTERVAL;
        
        if halvings >= 64 {
            return 0; // No more rewards after 64 halvings
        }
        
        INITIAL_REWARD >> halvings // Divide by 2^halvings
    }
    
    /// Estimate carbon emissions for a block
    fn estimate_block_emissions(&self, transactions: &[Transaction]) -> u64 {
        // Estimate based on transaction count and complexity
        let base_emissions = 1000; // Base emissions per block in grams CO2
        let tx_emissions = transactions.len() as u64 * 10; // 10g CO2 per transaction
        
        base_emissions + tx_emissions
    }
}

impl Default for MiningStats {
    fn default() -> Self {
        Self {
            total_hashes: 0,
            blocks_found: 0,
            uptime_seconds: 0,
            avg_hashrate_1h: 0.0,
            current_difficulty: 1.0,
            estimated_time_to_block: 600.0,
            power_consumption_watts: 0.0,
            energy_efficiency: 50.0,
            carbon_emissions_per_hash: 0.0,
            renewable_percentage: 0.0,
        }
    }
}

// Additional helper implementations for BlockTemplate
impl BlockTemplate {
    pub fn from_mining_template(template: &MiningTemplate) -> Self {
        // Convert MiningTemplate to BlockTemplate
        // This is a simplified conversion
        Self::new(
            template.version,
            hex::decode(&template.prev_hash).unwrap_or_default().try_into().unwrap_or([0; 32]),
            template.target,
            vec![], // Reward address would be set elsewhere
            &MockMempool, // Simplified mempool interface
        )
    }
}

// Mock mempool for template creation
struct MockMempool;

use sha2::{Sha256, Digest}; 