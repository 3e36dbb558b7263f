use crate::config::Config;
use crate::crypto::quantum::{QuantumError, QuantumKeyPair};
use crate::crypto::zkp::ZkpParams;
use crate::environmental::dashboard::EmissionsTimePeriod;
use crate::environmental::treasury::{TreasuryError, VerificationStatus};
use crate::transaction_processor::TransactionProcessorError;
use crate::types::extended_transaction::QuantumTransaction;
use crate::types::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server bind address
    pub bind_address: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Rate limiting
    pub rate_limit_per_minute: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
            api_key: None,
            rate_limit_per_minute: 100,
        }
    }
}

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transaction processing error
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Quantum cryptography error
    #[error("Quantum error: {0}")]
    QuantumError(#[from] QuantumError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    ProcessorError(#[from] TransactionProcessorError),

    /// Emissions error
    #[error("Emissions error: {0}")]
    EmissionsError(String),

    /// Treasury error
    #[error("Treasury error: {0}")]
    TreasuryError(#[from] TreasuryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to bind to address: {0}")]
    BindError(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Main API for interacting with the Supernova blockchain
pub struct SupernovaApi {
    /// Configuration
    config: Config,
}

impl SupernovaApi {
    /// Create a new Supernova API
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create and process a transaction
    pub fn create_transaction(
        &self,
        _inputs: Vec<Vec<u8>>,
        _outputs: Vec<(u64, Vec<u8>)>,
    ) -> ApiResult<Transaction> {
        // Placeholder implementation
        Err(ApiError::ConfigError("Not implemented".to_string()))
    }

    /// Create a quantum-resistant transaction
    pub fn create_quantum_transaction(
        &self,
        _transaction: Transaction,
        _keypair: &QuantumKeyPair,
    ) -> ApiResult<QuantumTransaction> {
        // Placeholder implementation
        Err(ApiError::ConfigError("Not implemented".to_string()))
    }

    /// Create a confidential transaction with hidden amounts
    pub fn create_confidential_transaction(
        &self,
        _inputs: Vec<Vec<u8>>,
        _outputs: Vec<(u64, Vec<u8>)>,
        _zkp_params: ZkpParams,
    ) -> ApiResult<Transaction> {
        // Placeholder implementation
        Err(ApiError::ConfigError("Not implemented".to_string()))
    }

    /// Query environmental metrics
    pub fn get_environmental_metrics(&self, _period: EmissionsTimePeriod) -> ApiResult<String> {
        // Placeholder implementation
        Err(ApiError::ConfigError("Not implemented".to_string()))
    }

    /// Register a renewable energy certificate
    pub fn register_renewable_certificate(
        &self,
        _amount_mwh: f64,
        _provider: &str,
        _verification_status: VerificationStatus,
    ) -> ApiResult<String> {
        // Placeholder implementation
        Err(ApiError::ConfigError("Not implemented".to_string()))
    }
}

/// Main API server
#[derive(Debug)]
pub struct Api {
    config: ApiConfig,
    listener: Option<TcpListener>,
}

impl Api {
    /// Create a new API instance
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    /// Start the API server
    pub async fn start(&mut self) -> Result<(), ApiError> {
        let listener = TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|e| ApiError::BindError(e.to_string()))?;

        self.listener = Some(listener);

        Ok(())
    }

    /// Stop the API server
    pub fn stop(&mut self) {
        self.listener = None;
    }

    /// Get the configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert!(config.enable_cors);
        assert_eq!(config.rate_limit_per_minute, 100);
    }
}
