// Zero-Knowledge Proof System for Confidential Transactions
// This module provides ZKP primitives to enable privacy features in the blockchain

use sha2::{Sha256, Digest};
use rand::{CryptoRng, RngCore};
use std::collections::HashMap;
use std::fmt;
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::MultiscalarMul,
};
use merlin::Transcript;
use thiserror::Error;
use serde::{Serialize, Deserialize};

/// Type of zero-knowledge proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZkpType {
    /// Range proof for hidden values
    RangeProof,
    /// Proof of knowledge for a discrete logarithm
    Schnorr,
    /// Bulletproofs for compact range proofs
    Bulletproof,
    /// Zero-knowledge Succinct Non-interactive ARgument of Knowledge
    ZkSnark,
}

/// A commitment to a value that can be revealed later
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// The commitment value
    pub value: Vec<u8>,
    /// The type of commitment
    pub commitment_type: CommitmentType,
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commitment")
            .field("value", &hex::encode(&self.value))
            .field("type", &self.commitment_type)
            .finish()
    }
}

/// Types of commitments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentType {
    /// Pedersen commitment for values
    Pedersen,
    /// ElGamal commitment (allows homomorphic encryption)
    ElGamal,
}

/// A zero-knowledge proof
#[derive(Clone, Serialize, Deserialize)]
pub struct ZeroKnowledgeProof {
    /// Type of the proof
    pub proof_type: ZkpType,
    /// The proof data
    pub proof: Vec<u8>,
    /// Public inputs to the proof
    pub public_inputs: Vec<Vec<u8>>,
}

impl fmt::Debug for ZeroKnowledgeProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZeroKnowledgeProof")
            .field("type", &self.proof_type)
            .field("proof_len", &self.proof.len())
            .field("public_inputs", &self.public_inputs.len())
            .finish()
    }
}

impl ZeroKnowledgeProof {
    /// Convert proof to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        // Simple serialization: [proof_type (1 byte)][proof_len (4 bytes)][proof][num_inputs (4 bytes)][inputs...]
        let mut bytes = Vec::new();
        
        // Add proof type
        bytes.push(match self.proof_type {
            ZkpType::RangeProof => 0,
            ZkpType::Schnorr => 1,
            ZkpType::Bulletproof => 2,
            ZkpType::ZkSnark => 3,
        });
        
        // Add proof data
        bytes.extend_from_slice(&(self.proof.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.proof);
        
        // Add public inputs
        bytes.extend_from_slice(&(self.public_inputs.len() as u32).to_be_bytes());
        for input in &self.public_inputs {
            bytes.extend_from_slice(&(input.len() as u32).to_be_bytes());
            bytes.extend_from_slice(input);
        }
        
        bytes
    }
}

/// Parameters for generating proofs
#[derive(Debug, Clone)]
pub struct ZkpParams {
    /// Type of proof to generate
    pub proof_type: ZkpType,
    /// Security parameter (higher = more secure but larger proofs)
    pub security_level: u8,
}

impl Default for ZkpParams {
    fn default() -> Self {
        Self {
            proof_type: ZkpType::Bulletproof,
            security_level: 128, // 128-bit security
        }
    }
}

/// The generators used for Pedersen commitments
pub struct PedersenGenerators {
    /// Base point for the value
    pub h: RistrettoPoint,
    /// Base point for the blinding factor
    pub g: RistrettoPoint,
}

impl Default for PedersenGenerators {
    fn default() -> Self {
        let g = curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
        
        // Create h as a hash-to-point of g to ensure discrete log relation is unknown
        let mut hasher = Sha256::new();
        // Convert g to bytes for hashing
        let g_compressed = g.compress();
        let g_bytes = g_compressed.as_bytes();
        hasher.update(g_bytes);
        hasher.update(b"h_generator");
        let h_seed = hasher.finalize();
        
        // Convert hash to a point on the curve
        let mut h_bytes = [0u8; 32];
        h_bytes.copy_from_slice(&h_seed[0..32]);
        
        // Convert to a RistrettoPoint
        let mut h_bytes_extended = [0u8; 64];
        h_bytes_extended[..32].copy_from_slice(&h_bytes);
        let h = RistrettoPoint::from_uniform_bytes(&h_bytes_extended);
        
        Self { g, h }
    }
}

/// Creates a Pedersen commitment to a value
pub fn commit_pedersen<R: CryptoRng + RngCore>(
    value: u64,
    rng: &mut R,
) -> (Commitment, Vec<u8>) { // Returns (commitment, blinding_factor)
    // Use elliptic curve operations for Pedersen commitment
    let generators = PedersenGenerators::default();
    
    // Create a random blinding factor
    let mut blinding_bytes = [0u8; 32];
    rng.fill_bytes(&mut blinding_bytes);
    let blinding_factor = Scalar::from_bytes_mod_order(blinding_bytes);
    
    // Compute v*H + r*G
    let value_scalar = Scalar::from(value);
    let commitment_point = RistrettoPoint::multiscalar_mul(
        &[value_scalar, blinding_factor],
        &[generators.h, generators.g]
    );
    
    // Convert the point to bytes
    let commitment_bytes = commitment_point.compress().to_bytes().to_vec();
    
    // Return the commitment and blinding factor
    (
        Commitment {
            value: commitment_bytes,
            commitment_type: CommitmentType::Pedersen,
        },
        blinding_factor.to_bytes().to_vec(),
    )
}

/// Represents a bulletproof range proof
pub struct BulletproofRangeProof {
    /// The range proof data
    proof_data: Vec<u8>,
    /// The number of bits in the range
    bit_length: u8,
}

impl BulletproofRangeProof {
    /// Create a new bulletproof range proof
    pub fn new<R: CryptoRng + RngCore>(
        value: u64,
        blinding_factor: &[u8],
        bit_length: u8,
        rng: &mut R,
    ) -> Self {
        // Ensure our value fits within the range
        assert!(value < (1u64 << bit_length), "Value exceeds range");
        
        // Convert blinding factor to Scalar
        let mut blinding_bytes = [0u8; 32];
        blinding_bytes.copy_from_slice(&blinding_factor[0..32]);
        let blinding_scalar = Scalar::from_bytes_mod_order(blinding_bytes);
        
        // Convert value to Scalar
        let value_scalar = Scalar::from(value);
        
        // Create a transcript for the Fiat-Shamir heuristic
        let mut transcript = Transcript::new(b"bulletproof-range-proof");
        
        // Generate the generators for the Bulletproof
        let generators = PedersenGenerators::default();
        
        // Add public parameters to the transcript
        transcript.append_message(b"bit_length", &[bit_length]);
        transcript.append_message(b"generators", generators.g.compress().as_bytes());
        transcript.append_message(b"h_generator", generators.h.compress().as_bytes());
        
        // Calculate the commitment C = v*H + r*G
        let commitment_point = RistrettoPoint::multiscalar_mul(
            &[value_scalar, blinding_scalar],
            &[generators.h, generators.g]
        );
        
        // Add the commitment to the transcript
        transcript.append_message(b"commitment", commitment_point.compress().as_bytes());
        
        // In a full implementation, we would now generate the Bulletproof range proof
        // This is a complex procedure involving vector Pedersen commitments and inner product arguments
        // For now, we'll create a simplified proof structure with the correct size characteristics
        
        // A Bulletproof has size 2*log2(n) + O(1) elements
        // For a 64-bit range proof, that's approximately 2*6 + 8 = 20 group elements
        // Each compressed RistrettoPoint is 32 bytes
        let proof_size = 2 * ((bit_length as f32).log2().ceil() as usize) * 32 + 64;
        
        // Create a deterministic but unique proof based on the inputs
        let mut proof_data = Vec::with_capacity(proof_size);
        
        // Add the commitment point
        proof_data.extend_from_slice(&commitment_point.compress().to_bytes());
        
        // Add a challenge value derived from the transcript
        let mut challenge_bytes = [0u8; 32];
        transcript.challenge_bytes(b"challenge", &mut challenge_bytes);
        proof_data.extend_from_slice(&challenge_bytes);
        
        // Fill the rest with deterministic bytes based on value and blinding
        let mut hasher = Sha256::new();
        hasher.update(&value.to_le_bytes());
        hasher.update(blinding_factor);
        hasher.update(&challenge_bytes);
        let digest = hasher.finalize();
        
        while proof_data.len() < proof_size {
            // Use the hash to generate more data
            hasher = Sha256::new();
            hasher.update(&proof_data);
            let more_bytes = hasher.finalize();
            proof_data.extend_from_slice(&more_bytes);
        }
        
        // Truncate to exact size
        proof_data.truncate(proof_size);
        
        Self {
            proof_data,
            bit_length,
        }
    }
    
    /// Verify the range proof against a commitment
    pub fn verify(&self, commitment: &Commitment) -> bool {
        if commitment.commitment_type != CommitmentType::Pedersen {
            return false;
        }
        
        // In a real implementation, we will:
        // 1. Reconstruct the generators
        // 2. Extract the commitment point from the commitment
        // 3. Recreate the transcript
        // 4. Verify the Bulletproof using the commitment and transcript
        
        // For now, we'll do basic structure validation
        
        // Check minimum expected proof size
        let min_proof_size = 2 * ((self.bit_length as f32).log2().ceil() as usize) * 32 + 32;
        if self.proof_data.len() < min_proof_size {
            return false;
        }
        
        // Check if the commitment bytes are at the start of the proof
        // This would be the case in a real bulletproof
        if commitment.value.len() != 32 || self.proof_data.len() < 32 {
            return false;
        }
        
        // In a real implementation, we would verify the bulletproof here
        // For now, we'll return true to simulate successful verification
        true
    }
    
    /// Get the serialized proof data
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.proof_data.len() + 1);
        result.push(self.bit_length);
        result.extend_from_slice(&self.proof_data);
        result
    }
    
    /// Create from serialized proof data
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        
        let bit_length = bytes[0];
        let proof_data = bytes[1..].to_vec();
        
        // Basic validation
        let min_proof_size = 2 * ((bit_length as f32).log2().ceil() as usize) * 32 + 32;
        if proof_data.len() < min_proof_size {
            return None;
        }
        
        Some(Self {
            proof_data,
            bit_length,
        })
    }
}

/// Creates a range proof that a committed value is within a range
pub fn create_range_proof<R: CryptoRng + RngCore>(
    value: u64,
    blinding_factor: &[u8],
    range_bits: u8, // Proves value is in [0, 2^range_bits)
    params: ZkpParams,
    rng: &mut R,
) -> ZeroKnowledgeProof {
    match params.proof_type {
        ZkpType::RangeProof => create_simple_range_proof(value, blinding_factor, range_bits, rng),
        ZkpType::Bulletproof => create_bulletproof(value, blinding_factor, range_bits, params.security_level, rng),
        _ => panic!("Unsupported proof type for range proofs"),
    }
}

/// Creates a simple range proof (less efficient)
fn create_simple_range_proof<R: CryptoRng + RngCore>(
    value: u64,
    blinding_factor: &[u8],
    range_bits: u8,
    rng: &mut R,
) -> ZeroKnowledgeProof {
    // Calculate Pedersen commitment
    let (commitment, _) = commit_pedersen(value, rng);
    
    // Create separate proofs for each bit
    // This is a naive implementation of a range proof where we prove each bit separately
    let mut proof_data = Vec::new();
    
    // Include range bits
    proof_data.push(range_bits);
    
    // For each bit, create a zero-knowledge proof that the bit is either 0 or 1
    for i in 0..range_bits {
        let bit = ((value >> i) & 1) == 1;
        
        // Create a Schnorr-like proof for this bit
        // In a real implementation, this would be a complex ZK circuit
        
        // Create a random nonce for the proof
        let mut nonce = [0u8; 32];
        rng.fill_bytes(&mut nonce);
        
        // Hash the bit, blinding factor, and nonce to create a deterministic proof
        let mut hasher = Sha256::new();
        hasher.update(&[bit as u8]);
        hasher.update(blinding_factor);
        hasher.update(&nonce);
        hasher.update(&commitment.value);
        hasher.update(&[i]);
        let hash = hasher.finalize();
        
        // Add the bit proof to the overall proof
        proof_data.extend_from_slice(&nonce);
        proof_data.extend_from_slice(&hash);
    }
    
    // Public inputs would include the commitment and the range
    let public_inputs = vec![
        commitment.value.clone(),
        vec![range_bits],
    ];
    
    ZeroKnowledgeProof {
        proof_type: ZkpType::RangeProof,
        proof: proof_data,
        public_inputs,
    }
}

/// Creates a bulletproof (more efficient range proof)
fn create_bulletproof<R: CryptoRng + RngCore>(
    value: u64,
    blinding_factor: &[u8],
    range_bits: u8,
    security_level: u8,
    rng: &mut R,
) -> ZeroKnowledgeProof {
    // Create a Bulletproof range proof
    let bulletproof = BulletproofRangeProof::new(value, blinding_factor, range_bits, rng);
    
    // Calculate commitment for public input
    let (commitment, _) = commit_pedersen(value, rng);
    
    // Public inputs include the commitment and range specification
    let public_inputs = vec![
        commitment.value.clone(),
        vec![range_bits],
    ];
    
    ZeroKnowledgeProof {
        proof_type: ZkpType::Bulletproof,
        proof: bulletproof.to_bytes(),
        public_inputs,
    }
}

/// Verifies a range proof
pub fn verify_range_proof(
    commitment: &Commitment,
    proof: &ZeroKnowledgeProof,
    range_bits: u8,
) -> bool {
    match proof.proof_type {
        ZkpType::RangeProof => verify_simple_range_proof(commitment, proof, range_bits),
        ZkpType::Bulletproof => verify_bulletproof(commitment, proof, range_bits),
        _ => false, // Unsupported proof type
    }
}

/// Verifies a simple range proof
fn verify_simple_range_proof(
    commitment: &Commitment,
    proof: &ZeroKnowledgeProof,
    range_bits: u8,
) -> bool {
    // Check that the proof has the expected structure
    if proof.public_inputs.len() != 2 {
        return false;
    }
    
    // Check that the range specification matches
    if proof.public_inputs[1].len() != 1 || proof.public_inputs[1][0] != range_bits {
        return false;
    }
    
    // Check that the commitment matches
    if proof.public_inputs[0] != commitment.value {
        return false;
    }
    
    // Check proof structure
    if proof.proof.is_empty() || proof.proof[0] != range_bits {
        return false;
    }
    
    // The proof should have data for each bit
    let expected_proof_size = 1 + range_bits as usize * (32 + 32); // 1 byte for range_bits + (nonce + hash) for each bit
    if proof.proof.len() != expected_proof_size {
        return false;
    }
    
    // In a real implementation, we would verify each bit proof
    // For now, we return true for a well-formed proof
    true
}

/// Verifies a bulletproof
fn verify_bulletproof(
    commitment: &Commitment,
    proof: &ZeroKnowledgeProof,
    range_bits: u8,
) -> bool {
    // Check that the proof has the expected structure
    if proof.public_inputs.len() != 2 {
        return false;
    }
    
    // Check that the range specification matches
    if proof.public_inputs[1].len() != 1 || proof.public_inputs[1][0] != range_bits {
        return false;
    }
    
    // Parse the bulletproof
    let bulletproof = match BulletproofRangeProof::from_bytes(&proof.proof) {
        Some(bp) => bp,
        None => return false,
    };
    
    // Verify the bulletproof against the commitment
    bulletproof.verify(commitment)
}

/// Creates a confidential transaction output
pub struct ConfidentialOutput {
    /// Commitment to the amount
    pub amount_commitment: Commitment,
    /// Range proof that the amount is positive
    pub range_proof: ZeroKnowledgeProof,
    /// Public key for the recipient
    pub recipient_pubkey: Vec<u8>,
}

/// Creates a confidential transaction
pub fn create_confidential_transaction<R: CryptoRng + RngCore>(
    inputs: &[(Vec<u8>, u64)], // (txid, amount)
    outputs: &[(Vec<u8>, u64)], // (recipient_pubkey, amount)
    params: ZkpParams,
    rng: &mut R,
) -> (Vec<Commitment>, Vec<ZeroKnowledgeProof>, Vec<u8>) { // (commitments, proofs, transaction)
    // In a real implementation, this would create a transaction with hidden amounts
    // For demo purposes, we'll create commitments and proofs
    
    let mut commitments = Vec::new();
    let mut proofs = Vec::new();
    let mut blinding_factors = Vec::new();
    
    // Create a commitment and range proof for each output
    for (pubkey, amount) in outputs {
        // Commit to the amount
        let (commitment, blinding) = commit_pedersen(*amount, rng);
        
        // Create a range proof for the amount (64-bit range)
        let range_proof = create_range_proof(
            *amount,
            &blinding,
            64, // Prove amount is in [0, 2^64)
            params.clone(),
            rng,
        );
        
        commitments.push(commitment);
        proofs.push(range_proof);
        blinding_factors.push(blinding);
    }
    
    // Future enhancements: create a zero-knowledge proof that:
    // 1. The transaction balances (sum of inputs = sum of outputs + fee)
    // 2. The signer owns the input amounts
    
    // For demo purposes, we'll create a dummy transaction
    let mut transaction = Vec::new();
    for (txid, _) in inputs {
        transaction.extend_from_slice(txid);
    }
    for (pubkey, _) in outputs {
        transaction.extend_from_slice(pubkey);
    }
    for commitment in &commitments {
        transaction.extend_from_slice(&commitment.value);
    }
    
    (commitments, proofs, transaction)
}

/// A zero-knowledge proof that two commitments commit to the same value
pub fn prove_equality<R: CryptoRng + RngCore>(
    value: u64,
    blinding_factor1: &[u8],
    blinding_factor2: &[u8],
    rng: &mut R,
) -> ZeroKnowledgeProof {
    // Future enhancements: create a zero-knowledge proof of equality
    // For demo purposes, we'll create a simulated proof
    
    // Create a simulated proof
    let mut proof = vec![0u8; 128];
    rng.fill_bytes(&mut proof);
    
    // Add some "structure" to the proof based on the actual values
    let mut hasher = Sha256::new();
    hasher.update(&value.to_le_bytes());
    hasher.update(blinding_factor1);
    hasher.update(blinding_factor2);
    let digest = hasher.finalize();
    
    // Mix in the digest
    for i in 0..std::cmp::min(32, proof.len()) {
        proof[i] ^= digest[i];
    }
    
    // Future enhancements: the public inputs should be the two commitments
    let public_inputs = vec![
        Sha256::digest(&[&value.to_le_bytes(), blinding_factor1].concat()).to_vec(),
        Sha256::digest(&[&value.to_le_bytes(), blinding_factor2].concat()).to_vec(),
    ];
    
    ZeroKnowledgeProof {
        proof_type: ZkpType::Schnorr,
        proof,
        public_inputs,
    }
}

/// A zero-knowledge proof circuit for more complex statements
pub struct ZkCircuit {
    /// Internal representation of the circuit
    constraints: Vec<(usize, usize, usize)>, // (a, b, c) represents a * b = c
    /// Number of variables in the circuit
    num_vars: usize,
    /// Number of public inputs
    num_public: usize,
    /// Number of private inputs
    num_private: usize,
}

impl ZkCircuit {
    /// Create a new circuit
    pub fn new(num_public: usize, num_private: usize) -> Self {
        Self {
            constraints: Vec::new(),
            num_vars: num_public + num_private,
            num_public,
            num_private,
        }
    }
    
    /// Add a constraint: a * b = c
    pub fn add_constraint(&mut self, a: usize, b: usize, c: usize) {
        assert!(a < self.num_vars && b < self.num_vars && c < self.num_vars);
        self.constraints.push((a, b, c));
    }
    
    /// Generate a zk-SNARK proof for this circuit
    pub fn prove<R: CryptoRng + RngCore>(
        &self,
        public_inputs: &[u64],
        private_inputs: &[u64],
        rng: &mut R,
    ) -> ZeroKnowledgeProof {
        // Future enhancements: this should generate a zk-SNARK proof
        // For demo purposes, we'll create a simulated proof
        
        assert_eq!(public_inputs.len(), self.num_public);
        assert_eq!(private_inputs.len(), self.num_private);
        
        // A zk-SNARK proof will be ~200-300 bytes
        let mut proof = vec![0u8; 256];
        rng.fill_bytes(&mut proof);
        
        // Add some "structure" to the proof based on the inputs and constraints
        let mut hasher = Sha256::new();
        for &input in public_inputs {
            hasher.update(&input.to_le_bytes());
        }
        for &input in private_inputs {
            hasher.update(&input.to_le_bytes());
        }
        for &(a, b, c) in &self.constraints {
            hasher.update(&a.to_le_bytes());
            hasher.update(&b.to_le_bytes());
            hasher.update(&c.to_le_bytes());
        }
        let digest = hasher.finalize();
        
        // Mix in the digest
        for i in 0..std::cmp::min(32, proof.len()) {
            proof[i] ^= digest[i];
        }
        
        // Convert public inputs to byte vectors
        let public_inputs = public_inputs
            .iter()
            .map(|&input| input.to_le_bytes().to_vec())
            .collect();
        
        ZeroKnowledgeProof {
            proof_type: ZkpType::ZkSnark,
            proof,
            public_inputs,
        }
    }
    
    /// Verify a zk-SNARK proof for this circuit
    pub fn verify(&self, public_inputs: &[u64], proof: &ZeroKnowledgeProof) -> bool {
        // Future enhancements: verify a zk-SNARK proof
        // For demo purposes, we'll always return true if the public inputs match
        
        if proof.proof_type != ZkpType::ZkSnark || public_inputs.len() != self.num_public {
            return false;
        }
        
        // Check that the public inputs match what's in the proof
        for (i, &input) in public_inputs.iter().enumerate() {
            if i >= proof.public_inputs.len() || 
               proof.public_inputs[i] != input.to_le_bytes().to_vec() {
                return false;
            }
        }
        
        // Future enhancement: verify the proof
        // For demo purposes, we'll return true
        true
    }
}

/// Errors that can occur in zero-knowledge operations
#[derive(Debug, thiserror::Error)]
pub enum ZkpError {
    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),
    
    #[error("Invalid range proof: {0}")]
    InvalidRangeProof(String),
    
    #[error("Proof verification failed: {0}")]
    VerificationFailed(String),
    
    #[error("Unsupported zero-knowledge proof type")]
    UnsupportedProofType,
    
    #[error("ZKP feature is disabled in configuration")]
    FeatureDisabled,
    
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    
    #[error("Cryptographic error: {0}")]
    CryptoError(String),
    
    #[error("Serialization error: {0}")]
    SerializationError(String),
    
    #[error("Out of range value: {0}")]
    OutOfRange(String),
}


/// Generate a zero-knowledge proof
pub fn generate_zkp(
    statement: &[u8],
    witness: &[u8],
    params: &ZkpParams,
) -> Result<ZeroKnowledgeProof, ZkpError> {
    // Simple implementation for now
    use sha2::{Sha256, Digest};
    
    let mut hasher = Sha256::new();
    hasher.update(statement);
    hasher.update(witness);
    hasher.update(&params.security_level.to_be_bytes());
    
    let proof_data = hasher.finalize().to_vec();
    
    // In production, use actual ZK proof generation
    Ok(ZeroKnowledgeProof {
        proof_type: params.proof_type,
        proof: proof_data,
        public_inputs: vec![statement.to_vec()],
    })
}

/// Verify a zero-knowledge proof
pub fn verify_zkp(
    proof: &ZeroKnowledgeProof,
    statement: &[u8],
    params: &ZkpParams,
) -> Result<bool, ZkpError> {
    // Simple verification for now
    if proof.public_inputs.is_empty() || proof.public_inputs[0] != statement {
        return Ok(false);
    }
    
    if proof.proof_type != params.proof_type {
        return Ok(false);
    }
    
    // In production, use actual ZK proof verification
    Ok(true)
} 