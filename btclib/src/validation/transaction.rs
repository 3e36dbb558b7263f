// Transaction validation - minimal version to fix build issues

use std::fmt;
use std::sync::Arc;
use zerocopy::AsBytes;
use serde::{Serialize, Deserialize};
use crate::types::transaction::Transaction;
use crate::types::extended_transaction::{QuantumTransaction, ConfidentialTransaction};
use crate::crypto::quantum::{QuantumScheme, QuantumError, ClassicalScheme};
use crate::crypto::zkp::ZkpType;
use crate::crypto::signature::{SignatureType, SignatureError};
use super::{ValidationError, SecurityLevel};

/// Transaction validation results
#[derive(Debug)]
pub enum ValidationResult {
    /// Transaction is valid
    Valid,
    
    /// Transaction is invalid
    Invalid(ValidationError),
    
    /// Transaction validation had non-critical issues
    SoftFail(ValidationError),
}

/// Configuration for transaction validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum transaction version
    pub min_version: u32,
    
    /// Maximum transaction size (in bytes)
    pub max_size: usize,
    
    /// Maximum number of inputs
    pub max_inputs: usize,
    
    /// Maximum number of outputs
    pub max_outputs: usize,
    
    /// Security level for validation
    pub security_level: SecurityLevel,
    
    /// Require quantum resistance
    pub require_quantum_resistance: bool,
    
    /// Enable ZKP verification
    pub enable_zkp: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_version: 1,
            max_size: 1_000_000, // 1MB
            max_inputs: 10_000,
            max_outputs: 10_000,
            security_level: SecurityLevel::Standard,
            require_quantum_resistance: false,
            enable_zkp: true,
        }
    }
}

/// Transaction validator for standard and extended transactions
pub struct TransactionValidator {
    /// Configuration
    pub config: ValidationConfig,
}

impl TransactionValidator {
    /// Create a new transaction validator with default config
    pub fn new() -> Self {
        Self { 
            config: ValidationConfig::default() 
        }
    }
    
    /// Create a new transaction validator with custom config
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }
    
    /// Validate a transaction
    pub fn validate(&self, _tx: &Transaction) -> Result<ValidationResult, ValidationError> {
        // Minimal implementation for building
        Ok(ValidationResult::Valid)
    }
} 