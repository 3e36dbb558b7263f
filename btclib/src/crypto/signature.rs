use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use rayon::prelude::*;

use crate::crypto::quantum::{QuantumScheme, QuantumParameters, QuantumError};

/// Error type for signature operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature scheme is not supported
    #[error("Signature scheme not supported: {0}")]
    UnsupportedScheme(String),
    
    /// The key is invalid or corrupted
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    
    /// The signature is invalid or corrupted
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    
    /// Batch verification failed
    #[error("Batch verification failed: {0}")]
    BatchVerificationFailed(String),
    
    /// A cryptographic operation failed
    #[error("Cryptographic operation failed: {0}")]
    CryptoOperationFailed(String),
    
    /// Quantum-specific error
    #[error("Quantum error: {0}")]
    QuantumError(#[from] QuantumError),
}

/// Type of signature scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureType {
    /// secp256k1 curve (used in Bitcoin)
    Secp256k1,
    /// Ed25519 curve (used in many modern cryptographic systems)
    Ed25519,
    /// CRYSTALS-Dilithium (post-quantum)
    Dilithium,
    /// Falcon (post-quantum)
    Falcon,
    /// SPHINCS+ (post-quantum)
    Sphincs,
    /// Hybrid scheme (classical + post-quantum)
    Hybrid,
}

/// Parameters for signature operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParams {
    /// Signature type
    pub sig_type: SignatureType,
    /// Security level for post-quantum schemes
    pub security_level: u8,
    /// Whether to enable batch verification
    pub enable_batch: bool,
}

impl Default for SignatureParams {
    fn default() -> Self {
        Self {
            sig_type: SignatureType::Secp256k1,
            security_level: 3, // Medium security by default
            enable_batch: true,
        }
    }
}

/// Trait for signature schemes
pub trait SignatureScheme: Send + Sync {
    /// Verify a single signature
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, SignatureError>;
    
    /// Verify multiple signatures in a batch
    fn batch_verify(
        &self, 
        keys: &[&[u8]], 
        messages: &[&[u8]], 
        signatures: &[&[u8]]
    ) -> Result<bool, SignatureError> {
        // Default implementation verifies each signature individually
        if keys.len() != messages.len() || keys.len() != signatures.len() {
            return Err(SignatureError::BatchVerificationFailed(
                "Mismatched number of keys, messages, and signatures".to_string()
            ));
        }
        
        // Use rayon for parallel verification
        let results: Vec<Result<bool, SignatureError>> = keys
            .par_iter()
            .zip(messages.par_iter())
            .zip(signatures.par_iter())
            .map(|((key, msg), sig)| self.verify(key, msg, sig))
            .collect();
        
        // Check if any verification failed
        for result in results {
            match result {
                Ok(valid) if !valid => return Ok(false),
                Err(e) => return Err(e),
                _ => {}
            }
        }
        
        Ok(true)
    }
    
    /// Get the signature type
    fn signature_type(&self) -> SignatureType;
}

/// Implementation of secp256k1 signature scheme
pub struct Secp256k1Scheme;

impl SignatureScheme for Secp256k1Scheme {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, SignatureError> {
        // The actual implementation would use libsecp256k1 to verify the signature
        // For now, just ensure the formats are correct
        
        if public_key.len() != 33 && public_key.len() != 65 {
            return Err(SignatureError::InvalidKey(
                format!("Invalid secp256k1 public key length: expected 33 or 65, got {}", public_key.len())
            ));
        }
        
        if signature.len() != 64 && signature.len() != 65 {
            return Err(SignatureError::InvalidSignature(
                format!("Invalid secp256k1 signature length: expected 64 or 65, got {}", signature.len())
            ));
        }
        
        // In a real implementation, this would perform actual verification
        // using libsecp256k1's verify function
        
        Ok(true) // Placeholder
    }
    
    fn batch_verify(
        &self, 
        keys: &[&[u8]], 
        messages: &[&[u8]], 
        signatures: &[&[u8]]
    ) -> Result<bool, SignatureError> {
        // secp256k1 supports efficient batch verification
        // The actual implementation would use libsecp256k1's batch verification
        
        // For now, use the default implementation
        <Self as SignatureScheme>::batch_verify(self, keys, messages, signatures)
    }
    
    fn signature_type(&self) -> SignatureType {
        SignatureType::Secp256k1
    }
}

/// Implementation of Ed25519 signature scheme
pub struct Ed25519Scheme;

impl SignatureScheme for Ed25519Scheme {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, SignatureError> {
        // The actual implementation would use ed25519-dalek to verify the signature
        
        if public_key.len() != 32 {
            return Err(SignatureError::InvalidKey(
                format!("Invalid Ed25519 public key length: expected 32, got {}", public_key.len())
            ));
        }
        
        if signature.len() != 64 {
            return Err(SignatureError::InvalidSignature(
                format!("Invalid Ed25519 signature length: expected 64, got {}", signature.len())
            ));
        }
        
        // In a real implementation, this would perform actual verification
        // using ed25519-dalek's verify function
        
        Ok(true) // Placeholder
    }
    
    fn signature_type(&self) -> SignatureType {
        SignatureType::Ed25519
    }
}

/// Implementation of CRYSTALS-Dilithium signature scheme
pub struct DilithiumScheme {
    security_level: u8,
}

impl DilithiumScheme {
    pub fn new(security_level: u8) -> Self {
        Self { security_level }
    }
}

impl SignatureScheme for DilithiumScheme {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, SignatureError> {
        // Use the existing quantum verification through the QuantumParameters conversion
        let params = QuantumParameters {
            scheme: QuantumScheme::Dilithium,
            security_level: self.security_level,
        };
        
        // Use the existing verify_quantum_signature function
        crate::crypto::quantum::verify_quantum_signature(
            public_key, message, signature, params
        ).map_err(SignatureError::QuantumError)
    }
    
    fn signature_type(&self) -> SignatureType {
        SignatureType::Dilithium
    }
}

/// Implementation of Falcon signature scheme
pub struct FalconScheme {
    security_level: u8,
}

impl FalconScheme {
    pub fn new(security_level: u8) -> Self {
        Self { security_level }
    }
}

impl SignatureScheme for FalconScheme {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, SignatureError> {
        // Create parameters using the appropriate security level
        use crate::crypto::falcon::{FalconParameters, FalconKeyPair, FalconError};
        
        let params = FalconParameters::with_security_level(self.security_level)
            .map_err(|e| SignatureError::CryptoOperationFailed(format!("Falcon parameter error: {}", e)))?;
            
        // Create a key pair with just the public key for verification
        let key_pair = FalconKeyPair::from_public_key(public_key.to_vec(), params)
            .map_err(|e| match e {
                FalconError::InvalidKey(msg) => SignatureError::InvalidKey(msg),
                err => SignatureError::CryptoOperationFailed(format!("Falcon error: {}", err)),
            })?;
            
        // Verify the signature
        key_pair.verify(message, signature)
            .map_err(|e| match e {
                FalconError::InvalidSignature(msg) => SignatureError::InvalidSignature(msg),
                err => SignatureError::CryptoOperationFailed(format!("Falcon verification error: {}", err)),
            })
    }
    
    fn signature_type(&self) -> SignatureType {
        SignatureType::Falcon
    }
}

/// Implementation of SPHINCS+ signature scheme
pub struct SphincsScheme {
    security_level: u8,
}

impl SphincsScheme {
    pub fn new(security_level: u8) -> Self {
        Self { security_level }
    }
}

impl SignatureScheme for SphincsScheme {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, SignatureError> {
        // For now, return unsupported error
        // This will be implemented with the actual SPHINCS+ code
        Err(SignatureError::CryptoOperationFailed(
            "SPHINCS+ verification not yet implemented".to_string()
        ))
    }
    
    fn signature_type(&self) -> SignatureType {
        SignatureType::Sphincs
    }
}

/// Implementation of hybrid signature scheme
pub struct HybridScheme {
    classical_scheme: Box<dyn SignatureScheme>,
    quantum_scheme: Box<dyn SignatureScheme>,
}

impl HybridScheme {
    pub fn new(
        classical_scheme: Box<dyn SignatureScheme>,
        quantum_scheme: Box<dyn SignatureScheme>
    ) -> Self {
        Self { classical_scheme, quantum_scheme }
    }
}

impl SignatureScheme for HybridScheme {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, SignatureError> {
        // A hybrid signature combines a classical and quantum signature
        // The public key and signature need to be split into classical and quantum parts
        
        // This is a placeholder implementation - in reality it would:
        // 1. Split the signature into classical and quantum parts
        // 2. Split the public key into classical and quantum parts
        // 3. Verify both signatures
        // 4. Return true only if both verify successfully
        
        Err(SignatureError::CryptoOperationFailed(
            "Hybrid verification not yet implemented".to_string()
        ))
    }
    
    fn signature_type(&self) -> SignatureType {
        SignatureType::Hybrid
    }
}

/// Unified signature verifier for all signature types
pub struct SignatureVerifier {
    schemes: HashMap<SignatureType, Box<dyn SignatureScheme>>,
}

impl SignatureVerifier {
    /// Create a new signature verifier
    pub fn new() -> Self {
        let mut verifier = Self { schemes: HashMap::new() };
        
        // Register default schemes
        verifier.register(SignatureType::Secp256k1, Box::new(Secp256k1Scheme));
        verifier.register(SignatureType::Ed25519, Box::new(Ed25519Scheme));
        verifier.register(SignatureType::Dilithium, Box::new(DilithiumScheme::new(3)));
        verifier.register(SignatureType::Falcon, Box::new(FalconScheme::new(3)));
        
        verifier
    }
    
    /// Register a signature scheme
    pub fn register(&mut self, sig_type: SignatureType, scheme: Box<dyn SignatureScheme>) {
        self.schemes.insert(sig_type, scheme);
    }
    
    /// Verify a signature
    pub fn verify(
        &self,
        sig_type: SignatureType,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8]
    ) -> Result<bool, SignatureError> {
        let scheme = self.schemes.get(&sig_type).ok_or_else(|| {
            SignatureError::UnsupportedScheme(format!("Unsupported signature scheme: {:?}", sig_type))
        })?;
        
        scheme.verify(public_key, message, signature)
    }
    
    /// Verify a transaction signature
    pub fn verify_transaction(&self, tx: &crate::types::Transaction) -> Result<bool, SignatureError> {
        // This is a placeholder for transaction verification
        // The actual implementation would:
        // 1. Extract the public key from the transaction input script
        // 2. Calculate the transaction hash (sighash)
        // 3. Extract the signature from the transaction input script
        // 4. Determine the signature type (Secp256k1 for legacy, others for extended transactions)
        // 5. Verify the signature
        
        Ok(true) // Placeholder
    }
    
    /// Batch verify multiple signatures
    pub fn batch_verify(
        &self,
        sig_type: SignatureType,
        keys: &[&[u8]],
        messages: &[&[u8]],
        signatures: &[&[u8]]
    ) -> Result<bool, SignatureError> {
        let scheme = self.schemes.get(&sig_type).ok_or_else(|| {
            SignatureError::UnsupportedScheme(format!("Unsupported signature scheme: {:?}", sig_type))
        })?;
        
        scheme.batch_verify(keys, messages, signatures)
    }
    
    /// Batch verify transactions
    pub fn batch_verify_transactions(&self, txs: &[&crate::types::Transaction]) -> Result<bool, SignatureError> {
        // This is a placeholder for batch transaction verification
        // The actual implementation would:
        // 1. Group transactions by signature type
        // 2. For each group, extract keys, messages, and signatures
        // 3. Call batch_verify for each group
        // 4. Return true only if all groups verify successfully
        
        Ok(true) // Placeholder
    }
}
