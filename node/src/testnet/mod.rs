use btclib::testnet::faucet::{Faucet, FaucetError};
use btclib::testnet::{TestNetConfig, TestNetManager};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

/// Testnet manager for the Supernova node
pub struct NodeTestnetManager {
    /// Core testnet manager from btclib
    core_manager: Arc<Mutex<TestNetManager>>,
    /// Node-specific testnet configuration
    config: TestnetNodeConfig,
    /// Faucet instance for distributing test tokens
    faucet: Option<Arc<Mutex<Faucet>>>,
    /// Test network statistics
    stats: Arc<Mutex<TestnetStats>>,
    /// Start time for uptime tracking
    start_time: Instant,
}

/// Node-specific testnet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestnetNodeConfig {
    /// Whether testnet mode is enabled
    pub enabled: bool,
    /// Testnet network ID
    pub network_id: String,
    /// Enable faucet functionality
    pub enable_faucet: bool,
    /// Faucet distribution amount in NOVA
    pub faucet_amount: u64,
    /// Faucet cooldown period in seconds
    pub faucet_cooldown: u64,
    /// Maximum faucet balance
    pub faucet_max_balance: u64,
    /// Enable test mining
    pub enable_test_mining: bool,
    /// Test mining difficulty
    pub test_mining_difficulty: u64,
    /// Enable network simulation
    pub enable_network_simulation: bool,
    /// Simulated network latency in milliseconds
    pub simulated_latency_ms: u64,
    /// Simulated packet loss percentage
    pub simulated_packet_loss: f64,
}

/// Testnet statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TestnetStats {
    /// Total faucet distributions
    pub total_faucet_distributions: u64,
    /// Total faucet amount distributed
    pub total_faucet_amount: u64,
    /// Number of unique faucet recipients
    pub unique_faucet_recipients: usize,
    /// Test blocks mined
    pub test_blocks_mined: u64,
    /// Test transactions processed
    pub test_transactions_processed: u64,
    /// Network simulation events
    pub network_simulation_events: u64,
    /// Testnet uptime in seconds
    pub uptime_seconds: u64,
}

/// Faucet distribution result
#[derive(Debug, Serialize, Deserialize)]
pub struct FaucetDistributionResult {
    /// Transaction ID
    pub txid: String,
    /// Amount distributed
    pub amount: u64,
    /// Recipient address
    pub recipient: String,
    /// Distribution timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Faucet status information
#[derive(Debug, Serialize, Deserialize)]
pub struct FaucetStatus {
    /// Whether faucet is active
    pub is_active: bool,
    /// Current faucet balance
    pub balance: u64,
    /// Transactions today
    pub transactions_today: u32,
    /// Last distribution time
    pub last_distribution: Option<chrono::DateTime<chrono::Utc>>,
    /// Cooldown period in seconds
    pub cooldown_secs: u64,
    /// Distribution amount
    pub distribution_amount: u64,
}

/// Recent faucet transaction
#[derive(Debug, Serialize, Deserialize)]
pub struct FaucetTransaction {
    /// Transaction ID
    pub txid: String,
    /// Recipient address
    pub recipient: String,
    /// Amount distributed
    pub amount: u64,
    /// Transaction timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Default for TestnetNodeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            network_id: "supernova-testnet".to_string(),
            enable_faucet: true,
            faucet_amount: 100_000_000,         // 1 NOVA in millinova
            faucet_cooldown: 3600,              // 1 hour
            faucet_max_balance: 10_000_000_000, // 100 NOVA
            enable_test_mining: true,
            test_mining_difficulty: 1000,
            enable_network_simulation: false,
            simulated_latency_ms: 100,
            simulated_packet_loss: 0.0,
        }
    }
}

impl NodeTestnetManager {
    /// Create a new testnet manager
    pub fn new(config: TestnetNodeConfig) -> Result<Self, String> {
        info!("Initializing Supernova testnet manager");

        // Create btclib testnet configuration
        let btclib_config = TestNetConfig {
            network_name: config.network_id.clone(),
            enable_faucet: config.enable_faucet,
            faucet_distribution_amount: config.faucet_amount,
            faucet_cooldown_secs: config.faucet_cooldown,
            initial_difficulty: config.test_mining_difficulty,
            ..TestNetConfig::default()
        };

        // Create core testnet manager
        let core_manager = Arc::new(Mutex::new(TestNetManager::new(btclib_config)));

        // Create faucet if enabled
        let faucet = if config.enable_faucet {
            let faucet_instance = Faucet::new(config.faucet_amount, config.faucet_cooldown);
            Some(Arc::new(Mutex::new(faucet_instance)))
        } else {
            None
        };

        let stats = Arc::new(Mutex::new(TestnetStats::default()));

        info!("Testnet manager initialized successfully");

        Ok(Self {
            core_manager,
            config,
            faucet,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Start the testnet manager
    pub async fn start(&self) -> Result<(), String> {
        info!("Starting testnet manager");

        if !self.config.enabled {
            return Err("Testnet is not enabled in configuration".to_string());
        }

        // Start periodic stats update
        let stats_clone = Arc::clone(&self.stats);
        let start_time = self.start_time;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                if let Ok(mut stats) = stats_clone.lock() {
                    stats.uptime_seconds = start_time.elapsed().as_secs();
                }
            }
        });

        info!("Testnet manager started successfully");
        Ok(())
    }

    /// Stop the testnet manager
    pub fn stop(&self) -> Result<(), String> {
        info!("Stopping testnet manager");
        // Cleanup logic here
        Ok(())
    }

    /// Request coins from the faucet
    pub async fn request_faucet_coins(
        &self,
        recipient: &str,
    ) -> Result<FaucetDistributionResult, FaucetError> {
        let faucet = self.faucet.as_ref().ok_or(FaucetError::FaucetDisabled)?;

        let mut faucet_guard = faucet
            .lock()
            .map_err(|_| FaucetError::Internal("Faucet lock poisoned".to_string()))?;
        let amount = faucet_guard.distribute_coins(recipient)?;

        // Update statistics
        if let Ok(mut stats) = self.stats.lock() {
            stats.total_faucet_distributions += 1;
            stats.total_faucet_amount += amount;
        }

        // Generate a mock transaction ID (in real implementation, this would be a real transaction)
        let txid = format!("test_{}", chrono::Utc::now().timestamp_nanos());

        info!(
            "Faucet distributed {} NOVA to {}",
            amount as f64 / 100_000_000.0,
            recipient
        );

        Ok(FaucetDistributionResult {
            txid,
            amount,
            recipient: recipient.to_string(),
            timestamp: chrono::Utc::now(),
        })
    }

    /// Get faucet status
    pub async fn get_faucet_status(&self) -> Result<FaucetStatus, String> {
        let faucet = self.faucet.as_ref().ok_or("Faucet is not enabled")?;

        let faucet_guard = faucet
            .lock()
            .map_err(|_| "Faucet lock poisoned".to_string())?;
        let stats = faucet_guard.get_statistics();

        Ok(FaucetStatus {
            is_active: self.config.enable_faucet,
            balance: self.config.faucet_max_balance, // Simplified - would track actual balance
            transactions_today: stats.distribution_count as u32, // Simplified
            last_distribution: None,                 // Would track actual last distribution
            cooldown_secs: stats.cooldown_period,
            distribution_amount: stats.distribution_amount,
        })
    }

    /// Get recent faucet transactions
    pub async fn get_recent_faucet_transactions(&self) -> Result<Vec<FaucetTransaction>, String> {
        // In a real implementation, this would fetch from a transaction log
        // For now, return empty list
        Ok(Vec::new())
    }

    /// Get testnet statistics
    pub fn get_stats(&self) -> Result<TestnetStats, String> {
        let stats = self
            .stats
            .lock()
            .map_err(|_| "Stats lock poisoned".to_string())?;
        Ok(stats.clone())
    }

    /// Process a test block
    pub fn process_test_block(
        &self,
        height: u64,
        timestamp: u64,
        miner: Option<String>,
    ) -> Result<(), String> {
        // Update core manager
        if let Ok(mut core) = self.core_manager.lock() {
            core.process_block(height, timestamp, miner);
        }

        // Update statistics
        if let Ok(mut stats) = self.stats.lock() {
            stats.test_blocks_mined += 1;
        }

        Ok(())
    }

    /// Process a test transaction
    pub fn process_test_transaction(&self, tx_id: &str) -> Result<(), String> {
        info!("Processing test transaction: {}", tx_id);

        // Update statistics
        if let Ok(mut stats) = self.stats.lock() {
            stats.test_transactions_processed += 1;
        }

        Ok(())
    }

    /// Simulate network conditions
    pub fn simulate_network_conditions(
        &self,
        latency_ms: Option<u64>,
        packet_loss: Option<f64>,
    ) -> Result<(), String> {
        if !self.config.enable_network_simulation {
            return Err("Network simulation is not enabled".to_string());
        }

        info!(
            "Simulating network conditions: latency={}ms, packet_loss={}%",
            latency_ms.unwrap_or(self.config.simulated_latency_ms),
            packet_loss.unwrap_or(self.config.simulated_packet_loss)
        );

        // Update statistics
        if let Ok(mut stats) = self.stats.lock() {
            stats.network_simulation_events += 1;
        }

        Ok(())
    }

    /// Get current mining difficulty
    pub fn get_current_difficulty(&self) -> u64 {
        if let Ok(core) = self.core_manager.lock() {
            core.get_current_difficulty()
        } else {
            self.config.test_mining_difficulty
        }
    }

    /// Check if testnet is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get testnet configuration
    pub fn get_config(&self) -> &TestnetNodeConfig {
        &self.config
    }

    /// Update testnet configuration
    pub fn update_config(&mut self, new_config: TestnetNodeConfig) -> Result<(), String> {
        info!("Updating testnet configuration");
        self.config = new_config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_testnet_manager_creation() {
        let config = TestnetNodeConfig::default();
        let manager = NodeTestnetManager::new(config).unwrap();
        assert!(!manager.is_enabled()); // Default is disabled
    }

    #[tokio::test]
    async fn test_faucet_functionality() {
        let mut config = TestnetNodeConfig::default();
        config.enabled = true;
        config.enable_faucet = true;

        let manager = NodeTestnetManager::new(config).unwrap();

        // Test faucet status
        let status = manager.get_faucet_status().await.unwrap();
        assert!(status.is_active);
        assert_eq!(status.distribution_amount, 100_000_000);
    }

    #[tokio::test]
    async fn test_stats_tracking() {
        let mut config = TestnetNodeConfig::default();
        config.enabled = true;

        let manager = NodeTestnetManager::new(config).unwrap();

        // Process some test data
        manager
            .process_test_block(1, 1234567890, Some("test_miner".to_string()))
            .unwrap();
        manager.process_test_transaction("test_tx_1").unwrap();

        let stats = manager.get_stats().unwrap();
        assert_eq!(stats.test_blocks_mined, 1);
        assert_eq!(stats.test_transactions_processed, 1);
    }
}
