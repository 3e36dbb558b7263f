use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Renewable Energy Certificate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewableCertificate {
    /// Certificate ID
    pub id: String,
    /// Provider of the certificate
    pub provider: String,
    /// Amount of renewable energy in MWh
    pub amount_mwh: f64,
    /// Timestamp of certification
    pub timestamp: u64,
    /// Description of the certificate
    pub description: String,
    /// Verification status (true if verified)
    pub verification_status: bool,
    /// Cost of the certificate in satoshi
    pub cost: u64,
}

/// Carbon Offset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonOffset {
    /// Offset ID
    pub id: String,
    /// Provider of the offset
    pub provider: String,
    /// Amount of carbon offset in tons CO2e
    pub amount_tons_co2e: f64,
    /// Timestamp of certification
    pub timestamp: u64,
    /// Description of the offset
    pub description: String,
    /// Verification status (true if verified)
    pub verification_status: bool,
    /// Cost of the offset in satoshi
    pub cost: u64,
}

/// Verification provider for environmental assets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationProvider {
    /// Provider ID
    pub id: String,
    /// Provider name
    pub name: String,
    /// Provider description
    pub description: String,
    /// Provider website
    pub website: String,
    /// Provider verification standards
    pub standards: Vec<String>,
    /// Provider verification methods
    pub methods: Vec<String>,
}

/// Verification manager for environmental assets
pub struct VerificationManager {
    /// List of verification providers
    providers: Vec<VerificationProvider>,
    /// Renewable energy certificates
    certificates: Vec<RenewableCertificate>,
    /// Carbon offsets
    offsets: Vec<CarbonOffset>,
}

impl VerificationManager {
    /// Create a new verification manager
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            certificates: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Add a verification provider
    pub fn add_provider(&mut self, provider: VerificationProvider) {
        self.providers.push(provider);
    }

    /// Add a renewable energy certificate
    pub fn add_certificate(&mut self, certificate: RenewableCertificate) {
        self.certificates.push(certificate);
    }

    /// Add a carbon offset
    pub fn add_offset(&mut self, offset: CarbonOffset) {
        self.offsets.push(offset);
    }

    /// Get all verification providers
    pub fn get_providers(&self) -> &[VerificationProvider] {
        &self.providers
    }

    /// Get all renewable energy certificates
    pub fn get_certificates(&self) -> &[RenewableCertificate] {
        &self.certificates
    }

    /// Get all carbon offsets
    pub fn get_offsets(&self) -> &[CarbonOffset] {
        &self.offsets
    }

    /// Verify a renewable energy certificate
    pub fn verify_certificate(&mut self, certificate_id: &str) -> bool {
        if let Some(certificate) = self.certificates.iter_mut().find(|c| c.id == certificate_id) {
            certificate.verification_status = true;
            true
        } else {
            false
        }
    }

    /// Verify a carbon offset
    pub fn verify_offset(&mut self, offset_id: &str) -> bool {
        if let Some(offset) = self.offsets.iter_mut().find(|o| o.id == offset_id) {
            offset.verification_status = true;
            true
        } else {
            false
        }
    }

    /// Generate a verification report
    pub fn generate_report(&self) -> VerificationReport {
        let total_certificates = self.certificates.len();
        let verified_certificates = self.certificates.iter().filter(|c| c.verification_status).count();
        let total_offsets = self.offsets.len();
        let verified_offsets = self.offsets.iter().filter(|o| o.verification_status).count();

        let total_mwh: f64 = self.certificates.iter().map(|c| c.amount_mwh).sum();
        let verified_mwh: f64 = self.certificates.iter().filter(|c| c.verification_status).map(|c| c.amount_mwh).sum();
        let total_tons: f64 = self.offsets.iter().map(|o| o.amount_tons_co2e).sum();
        let verified_tons: f64 = self.offsets.iter().filter(|o| o.verification_status).map(|o| o.amount_tons_co2e).sum();

        VerificationReport {
            timestamp: Utc::now(),
            total_certificates,
            verified_certificates,
            certificate_verification_percentage: if total_certificates > 0 {
                (verified_certificates as f64 / total_certificates as f64) * 100.0
            } else {
                0.0
            },
            total_offsets,
            verified_offsets,
            offset_verification_percentage: if total_offsets > 0 {
                (verified_offsets as f64 / total_offsets as f64) * 100.0
            } else {
                0.0
            },
            total_mwh,
            verified_mwh,
            mwh_verification_percentage: if total_mwh > 0.0 {
                (verified_mwh / total_mwh) * 100.0
            } else {
                0.0
            },
            total_tons_co2e: total_tons,
            verified_tons_co2e: verified_tons,
            tons_verification_percentage: if total_tons > 0.0 {
                (verified_tons / total_tons) * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Verification report for environmental assets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Timestamp of the report
    pub timestamp: DateTime<Utc>,
    /// Total number of certificates
    pub total_certificates: usize,
    /// Number of verified certificates
    pub verified_certificates: usize,
    /// Percentage of verified certificates
    pub certificate_verification_percentage: f64,
    /// Total number of offsets
    pub total_offsets: usize,
    /// Number of verified offsets
    pub verified_offsets: usize,
    /// Percentage of verified offsets
    pub offset_verification_percentage: f64,
    /// Total MWh of renewable energy
    pub total_mwh: f64,
    /// Verified MWh of renewable energy
    pub verified_mwh: f64,
    /// Percentage of verified MWh
    pub mwh_verification_percentage: f64,
    /// Total tons CO2e of carbon offsets
    pub total_tons_co2e: f64,
    /// Verified tons CO2e of carbon offsets
    pub verified_tons_co2e: f64,
    /// Percentage of verified tons CO2e
    pub tons_verification_percentage: f64,
} 