//! Hash utilities for the blockchain
//! Provides a simpler interface to the cryptographic hash functions

use crate::crypto::hash::{
    Hash, 
    HashAlgorithm, 
    Sha256Hash, 
    DoubleSha256Hash, 
    Blake3Hash, 
    SuperNovaHash
};

/// Default hash algorithm for general use in the blockchain
pub fn hash_default(data: &[u8]) -> Vec<u8> {
    let hasher = Sha256Hash;
    hasher.hash(data)
}

/// Double-SHA256 hash (Bitcoin compatible)
pub fn hash_double_sha256(data: &[u8]) -> Vec<u8> {
    let hasher = DoubleSha256Hash;
    hasher.hash(data)
}

/// Quantum-resistant hash (BLAKE3)
pub fn hash_quantum_resistant(data: &[u8]) -> Vec<u8> {
    let hasher = Blake3Hash;
    hasher.hash(data)
}

/// SuperNova's enhanced hash (combination of algorithms)
pub fn hash_supernova(data: &[u8]) -> Vec<u8> {
    let hasher = SuperNovaHash::new();
    hasher.hash(data)
}

/// Convert a 32-byte hash into a fixed-size array
pub fn to_32_bytes(hash: &[u8]) -> [u8; 32] {
    let mut result = [0u8; 32];
    
    // Handle different length hashes
    if hash.len() >= 32 {
        result.copy_from_slice(&hash[..32]);
    } else {
        // If hash is shorter than 32 bytes, pad with zeros
        let hash_len = hash.len();
        result[..hash_len].copy_from_slice(hash);
    }
    
    result
}

/// Converts a hexadecimal string to a 32-byte array
pub fn hex_to_32_bytes(hex: &str) -> Result<[u8; 32], hex::FromHexError> {
    // Remove "0x" prefix if present
    let hex_str = hex.trim_start_matches("0x");
    
    let bytes = hex::decode(hex_str)?;
    let mut result = [0u8; 32];
    
    if bytes.len() >= 32 {
        result.copy_from_slice(&bytes[..32]);
    } else {
        // If bytes is shorter than 32 bytes, pad with zeros
        let bytes_len = bytes.len();
        result[..bytes_len].copy_from_slice(&bytes);
    }
    
    Ok(result)
}

/// Check if a hash meets a specified difficulty target
/// Returns true if the hash is below the target
pub fn meets_difficulty(hash: &[u8], target: &[u8]) -> bool {
    if hash.len() != target.len() {
        return false;
    }
    
    for i in 0..hash.len() {
        if hash[i] < target[i] {
            return true;
        } else if hash[i] > target[i] {
            return false;
        }
    }
    
    // Equal to target
    true
}

/// 256-bit hash value alias
pub type Hash256 = Hash;

/// Perform SHA-256 hash (alias for hash_default)
pub fn hash256(data: &[u8]) -> Vec<u8> {
    hash_default(data)
}

/// Convert hash to hexadecimal string
pub fn hash_to_hex(hash_bytes: &[u8]) -> String {
    hex::encode(hash_bytes)
}

/// Perform double SHA-256 hash
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    hash_double_sha256(data)
}
