//! Quantum Canary - Early Warning System for Quantum Attacks
//!
//! This module implements a "canary in the coal mine" approach to detecting
//! quantum computer attacks before they can compromise the main system.
//!
//! The canary uses intentionally weakened quantum-resistant signatures that
//! would be broken first by an emerging quantum computer, giving us time
//! to activate emergency protocols.

use crate::crypto::quantum::{
    QuantumKeyPair, QuantumScheme, QuantumParameters,
    sign_quantum, verify_quantum_signature
};
use serde::{Serialize, Deserialize};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, Duration};
use std::collections::HashMap;

/// Quantum Canary System
#[derive(Debug, Clone)]
pub struct QuantumCanarySystem {
    /// Active canaries
    canaries: Arc<RwLock<HashMap<CanaryId, QuantumCanary>>>,
    
    /// Canary monitoring results
    monitoring_results: Arc<RwLock<Vec<MonitoringResult>>>,
    
    /// Emergency contacts for alerts
    alert_endpoints: Vec<String>,
    
    /// System configuration
    config: CanaryConfig,
}

/// Individual Quantum Canary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantumCanary {
    /// Unique canary identifier
    pub id: CanaryId,
    
    /// Intentionally weak quantum keys
    pub weak_keys: QuantumKeyPair,
    
    /// Canary value (bounty for breaking it)
    pub bounty_value: u64,
    
    /// Deployment timestamp
    pub deployed_at: SystemTime,
    
    /// Last verification timestamp
    pub last_verified: SystemTime,
    
    /// Compromise detection
    pub compromise_detected: bool,
    
    /// Canary transaction on blockchain
    pub canary_tx_id: Option<[u8; 32]>,
    
    /// Security level (intentionally low)
    pub security_level: u8,
}

/// Canary Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanaryConfig {
    /// Check interval
    pub check_interval: Duration,
    
    /// Canary deployment strategy
    pub deployment_strategy: DeploymentStrategy,
    
    /// Alert threshold
    pub alert_threshold: u32,
    
    /// Auto-migration on detection
    pub auto_migrate: bool,
    
    /// Bounty amounts for different levels
    pub bounty_tiers: Vec<u64>,
}

/// Canary Deployment Strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStrategy {
    /// Deploy canaries with progressively weaker security
    Progressive,
    /// Deploy multiple canaries at each security level
    Redundant,
    /// Deploy canaries across different quantum schemes
    Diverse,
    /// Combine all strategies
    Comprehensive,
}

/// Canary Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanaryId(pub [u8; 16]);

/// Monitoring Result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringResult {
    /// Canary ID
    pub canary_id: CanaryId,
    
    /// Check timestamp
    pub checked_at: SystemTime,
    
    /// Result of check
    pub status: CanaryStatus,
    
    /// Additional details
    pub details: Option<String>,
}

/// Canary Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanaryStatus {
    /// Canary is intact
    Healthy,
    /// Canary shows signs of attack
    Suspicious,
    /// Canary has been compromised
    Compromised,
    /// Canary check failed
    CheckFailed,
}

impl QuantumCanarySystem {
    /// Create new canary system
    pub fn new(config: CanaryConfig) -> Self {
        Self {
            canaries: Arc::new(RwLock::new(HashMap::new())),
            monitoring_results: Arc::new(RwLock::new(Vec::new())),
            alert_endpoints: Vec::new(),
            config,
        }
    }
    
    /// Deploy canaries according to strategy
    pub fn deploy_canaries(&self) -> Result<Vec<CanaryId>, CanaryError> {
        match self.config.deployment_strategy {
            DeploymentStrategy::Progressive => self.deploy_progressive_canaries(),
            DeploymentStrategy::Redundant => self.deploy_redundant_canaries(),
            DeploymentStrategy::Diverse => self.deploy_diverse_canaries(),
            DeploymentStrategy::Comprehensive => self.deploy_comprehensive_canaries(),
        }
    }
    
    /// Deploy progressively weaker canaries
    fn deploy_progressive_canaries(&self) -> Result<Vec<CanaryId>, CanaryError> {
        let mut deployed = Vec::new();
        
        // Deploy canaries with security levels 1-3 (production uses 3-5)
        for security_level in 1..=3 {
            let canary = self.create_canary(
                QuantumScheme::Dilithium,
                security_level,
                self.config.bounty_tiers.get(security_level as usize - 1)
                    .copied()
                    .unwrap_or(1000 * security_level as u64),
            )?;
            
            let id = canary.id;
            self.canaries.write().unwrap().insert(id, canary);
            deployed.push(id);
        }
        
        Ok(deployed)
    }
    
    /// Deploy redundant canaries at each level
    fn deploy_redundant_canaries(&self) -> Result<Vec<CanaryId>, CanaryError> {
        let mut deployed = Vec::new();
        
        // Deploy 3 canaries at each security level
        for security_level in 1..=2 {
            for _ in 0..3 {
                let canary = self.create_canary(
                    QuantumScheme::Dilithium,
                    security_level,
                    self.config.bounty_tiers.get(security_level as usize - 1)
                        .copied()
                        .unwrap_or(1000),
                )?;
                
                let id = canary.id;
                self.canaries.write().unwrap().insert(id, canary);
                deployed.push(id);
            }
        }
        
        Ok(deployed)
    }
    
    /// Deploy diverse canaries across schemes
    fn deploy_diverse_canaries(&self) -> Result<Vec<CanaryId>, CanaryError> {
        let mut deployed = Vec::new();
        
        let schemes = [
            QuantumScheme::Dilithium,
            QuantumScheme::Falcon,
            QuantumScheme::SphincsPlus,
        ];
        
        for scheme in &schemes {
            let canary = self.create_canary(*scheme, 1, 5000)?;
            let id = canary.id;
            self.canaries.write().unwrap().insert(id, canary);
            deployed.push(id);
        }
        
        Ok(deployed)
    }
    
    /// Deploy comprehensive canary coverage
    fn deploy_comprehensive_canaries(&self) -> Result<Vec<CanaryId>, CanaryError> {
        let mut deployed = Vec::new();
        
        // Combine all strategies
        deployed.extend(self.deploy_progressive_canaries()?);
        deployed.extend(self.deploy_redundant_canaries()?);
        deployed.extend(self.deploy_diverse_canaries()?);
        
        Ok(deployed)
    }
    
    /// Create individual canary
    fn create_canary(
        &self,
        scheme: QuantumScheme,
        security_level: u8,
        bounty_value: u64,
    ) -> Result<QuantumCanary, CanaryError> {
        // Generate intentionally weak keys
        let params = QuantumParameters {
            scheme,
            security_level,
        };
        
        let weak_keys = QuantumKeyPair::generate(params)?;
        
        // Generate unique ID
        let mut id_bytes = [0u8; 16];
        use rand::{RngCore, rngs::OsRng};
        OsRng.fill_bytes(&mut id_bytes);
        
        Ok(QuantumCanary {
            id: CanaryId(id_bytes),
            weak_keys,
            bounty_value,
            deployed_at: SystemTime::now(),
            last_verified: SystemTime::now(),
            compromise_detected: false,
            canary_tx_id: None,
            security_level,
        })
    }
    
    /// Check all canaries for compromise
    pub async fn check_all_canaries(&self) -> Result<Vec<MonitoringResult>, CanaryError> {
        let mut results = Vec::new();
        
        let canaries = self.canaries.read().unwrap().clone();
        
        for (id, mut canary) in canaries {
            let result = self.check_canary(&mut canary).await?;
            
            // Update canary if compromised
            if result.status == CanaryStatus::Compromised {
                canary.compromise_detected = true;
                self.canaries.write().unwrap().insert(id, canary.clone());
                
                // Trigger emergency response
                self.handle_compromise(&canary).await?;
            }
            
            results.push(result);
        }
        
        // Store results
        self.monitoring_results.write().unwrap().extend(results.clone());
        
        Ok(results)
    }
    
    /// Check individual canary
    async fn check_canary(&self, canary: &mut QuantumCanary) -> Result<MonitoringResult, CanaryError> {
        // Create test message
        let test_message = format!("canary-check-{}-{}", 
            hex::encode(canary.id.0),
            canary.last_verified.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs()
        );
        
        // Sign with canary's weak keys
        let signature = sign_quantum(&canary.weak_keys, test_message.as_bytes())?;
        
        // Verify signature still works
        let params = QuantumParameters {
            scheme: QuantumScheme::Dilithium,
            security_level: canary.security_level,
        };
        
        let verified = verify_quantum_signature(
            &canary.weak_keys.public_key,
            test_message.as_bytes(),
            &signature,
            params,
        )?;
        
        // Check if canary transaction has been spent (if deployed on-chain)
        let on_chain_status = if let Some(tx_id) = canary.canary_tx_id {
            self.check_on_chain_canary(tx_id).await?
        } else {
            CanaryStatus::Healthy
        };
        
        // Determine overall status
        let status = if !verified {
            CanaryStatus::Compromised
        } else if on_chain_status == CanaryStatus::Compromised {
            CanaryStatus::Compromised
        } else if self.detect_suspicious_activity(canary).await? {
            CanaryStatus::Suspicious
        } else {
            CanaryStatus::Healthy
        };
        
        // Update last verified time
        canary.last_verified = SystemTime::now();
        
        Ok(MonitoringResult {
            canary_id: canary.id,
            checked_at: SystemTime::now(),
            status,
            details: match status {
                CanaryStatus::Compromised => Some("Quantum attack detected!".to_string()),
                CanaryStatus::Suspicious => Some("Unusual activity detected".to_string()),
                _ => None,
            },
        })
    }
    
    /// Check on-chain canary transaction
    async fn check_on_chain_canary(&self, tx_id: [u8; 32]) -> Result<CanaryStatus, CanaryError> {
        // In production, this would check if the canary UTXO has been spent
        // For now, return healthy
        Ok(CanaryStatus::Healthy)
    }
    
    /// Detect suspicious activity around canary
    async fn detect_suspicious_activity(&self, canary: &QuantumCanary) -> Result<bool, CanaryError> {
        // Check for:
        // 1. Unusual number of signature verification attempts
        // 2. Timing attacks on the canary
        // 3. Network scanning for weak keys
        // 4. Attempted key extraction
        
        // For now, return false (no suspicious activity)
        Ok(false)
    }
    
    /// Handle compromised canary
    async fn handle_compromise(&self, canary: &QuantumCanary) -> Result<(), CanaryError> {
        // 1. Send alerts
        self.send_alerts(canary).await?;
        
        // 2. Log the event
        self.log_compromise(canary)?;
        
        // 3. Trigger emergency migration if configured
        if self.config.auto_migrate {
            self.trigger_emergency_migration(canary).await?;
        }
        
        Ok(())
    }
    
    /// Send alerts about compromised canary
    async fn send_alerts(&self, canary: &QuantumCanary) -> Result<(), CanaryError> {
        let alert_message = format!(
            "QUANTUM CANARY COMPROMISED!\n\
            Canary ID: {}\n\
            Security Level: {}\n\
            Deployed: {:?}\n\
            Compromised: {:?}\n\
            ACTION REQUIRED: Initiate quantum migration immediately!",
            hex::encode(canary.id.0),
            canary.security_level,
            canary.deployed_at,
            SystemTime::now()
        );
        
        // Send to all configured endpoints
        for endpoint in &self.alert_endpoints {
            // In production, send actual alerts (email, SMS, webhook, etc.)
            eprintln!("ALERT to {}: {}", endpoint, alert_message);
        }
        
        Ok(())
    }
    
    /// Log compromise event
    fn log_compromise(&self, canary: &QuantumCanary) -> Result<(), CanaryError> {
        use std::fs::OpenOptions;
        use std::io::Write;
        
        let log_entry = format!(
            "{:?} - COMPROMISE - Canary {} (Level {}) compromised\n",
            SystemTime::now(),
            hex::encode(canary.id.0),
            canary.security_level
        );
        
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open("quantum_canary.log")?;
        
        file.write_all(log_entry.as_bytes())?;
        
        Ok(())
    }
    
    /// Trigger emergency quantum migration
    async fn trigger_emergency_migration(&self, canary: &QuantumCanary) -> Result<(), CanaryError> {
        eprintln!(
            "EMERGENCY QUANTUM MIGRATION TRIGGERED!\n\
            Canary {} compromised at security level {}\n\
            Activating quantum-only mode...",
            hex::encode(canary.id.0),
            canary.security_level
        );
        
        // In production, this would:
        // 1. Disable all classical cryptography
        // 2. Force-close vulnerable channels
        // 3. Upgrade all keys to maximum security
        // 4. Notify all nodes of quantum threat
        
        Ok(())
    }
    
    /// Add alert endpoint
    pub fn add_alert_endpoint(&mut self, endpoint: String) {
        self.alert_endpoints.push(endpoint);
    }
    
    /// Get canary statistics
    pub fn get_statistics(&self) -> CanaryStatistics {
        let canaries = self.canaries.read().unwrap();
        let results = self.monitoring_results.read().unwrap();
        
        let total_canaries = canaries.len();
        let compromised = canaries.values().filter(|c| c.compromise_detected).count();
        let suspicious = results.iter()
            .filter(|r| r.status == CanaryStatus::Suspicious)
            .count();
        
        CanaryStatistics {
            total_canaries,
            healthy: total_canaries - compromised - suspicious,
            suspicious,
            compromised,
            last_check: results.last().map(|r| r.checked_at),
            total_bounty: canaries.values().map(|c| c.bounty_value).sum(),
        }
    }
}

/// Canary Statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanaryStatistics {
    pub total_canaries: usize,
    pub healthy: usize,
    pub suspicious: usize,
    pub compromised: usize,
    pub last_check: Option<SystemTime>,
    pub total_bounty: u64,
}

/// Canary Errors
#[derive(Debug, thiserror::Error)]
pub enum CanaryError {
    #[error("Quantum key generation failed: {0}")]
    KeyGeneration(#[from] crate::crypto::quantum::QuantumError),
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Canary deployment failed")]
    DeploymentFailed,
    
    #[error("Monitoring failed")]
    MonitoringFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[tokio::test]
    async fn test_canary_deployment() {
        let config = CanaryConfig {
            check_interval: Duration::from_secs(60),
            deployment_strategy: DeploymentStrategy::Progressive,
            alert_threshold: 1,
            auto_migrate: false,
            bounty_tiers: vec![1000, 5000, 10000],
        };
        
        let system = QuantumCanarySystem::new(config);
        let canaries = system.deploy_canaries().unwrap();
        
        assert_eq!(canaries.len(), 3);
        assert_eq!(system.canaries.read().unwrap().len(), 3);
    }
    
    #[tokio::test]
    async fn test_canary_monitoring() {
        let config = CanaryConfig {
            check_interval: Duration::from_secs(60),
            deployment_strategy: DeploymentStrategy::Progressive,
            alert_threshold: 1,
            auto_migrate: false,
            bounty_tiers: vec![1000],
        };
        
        let mut system = QuantumCanarySystem::new(config);
        system.add_alert_endpoint("test@example.com".to_string());
        
        let _canaries = system.deploy_canaries().unwrap();
        let results = system.check_all_canaries().await.unwrap();
        
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.status == CanaryStatus::Healthy));
    }
    
    #[test]
    fn test_canary_statistics() {
        let config = CanaryConfig {
            check_interval: Duration::from_secs(60),
            deployment_strategy: DeploymentStrategy::Comprehensive,
            alert_threshold: 1,
            auto_migrate: true,
            bounty_tiers: vec![1000, 5000, 10000],
        };
        
        let system = QuantumCanarySystem::new(config);
        let _canaries = system.deploy_canaries().unwrap();
        
        let stats = system.get_statistics();
        assert!(stats.total_canaries > 0);
        assert_eq!(stats.healthy, stats.total_canaries);
        assert_eq!(stats.compromised, 0);
    }
} 