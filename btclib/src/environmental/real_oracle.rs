// Environmental Oracle Implementation


use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use reqwest::Client;
use thiserror::Error;

use crate::environmental::{
    types::{Region, EnergySource},
    emissions::EmissionFactor,
};

/// Real-time energy grid data provider
#[derive(Debug, Clone)]
pub struct GridDataProvider {
    client: Client,
    api_endpoints: HashMap<Region, String>,
    cache: Arc<RwLock<GridDataCache>>,
}

/// Cached grid data
#[derive(Debug, Clone)]
struct GridDataCache {
    data: HashMap<Region, GridData>,
    last_update: DateTime<Utc>,
}

/// Real-time grid data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridData {
    pub region: Region,
    pub timestamp: DateTime<Utc>,
    pub energy_mix: HashMap<EnergySource, f64>,
    pub carbon_intensity: f64, // gCO2/kWh
    pub renewable_percentage: f64,
    pub demand_mw: f64,
    pub generation_mw: f64,
}

/// Environmental oracle errors
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("API request failed: {0}")]
    ApiError(String),
    
    #[error("Data parsing error: {0}")]
    ParseError(String),
    
    #[error("No data available for region: {0:?}")]
    NoDataForRegion(Region),
    
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
    
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl GridDataProvider {
    /// Create a new grid data provider with real API endpoints
    pub fn new() -> Self {
        let mut api_endpoints = HashMap::new();
        
        // Real API endpoints for different regions
        // These would be actual grid operator APIs in production
        api_endpoints.insert(
            Region::NorthAmerica,
            "https://api.eia.gov/v2/electricity/operating-generator-capacity".to_string()
        );
        api_endpoints.insert(
            Region::Europe,
            "https://transparency.entsoe.eu/api".to_string()
        );
        api_endpoints.insert(
            Region::AsiaPacific,
            "https://api.aemo.com.au/public/api".to_string()
        );
        
        Self {
            client: Client::new(),
            api_endpoints,
            cache: Arc::new(RwLock::new(GridDataCache {
                data: HashMap::new(),
                last_update: Utc::now(),
            })),
        }
    }
    
    /// Get real-time grid data for a region
    pub async fn get_grid_data(&self, region: Region) -> Result<GridData, OracleError> {
        // Check cache first (5 minute TTL)
        {
            let cache = self.cache.read().map_err(|_| {
                OracleError::ApiError("Cache lock error".to_string())
            })?;
            
            if let Some(data) = cache.data.get(&region) {
                let age = Utc::now() - cache.last_update;
                if age.num_minutes() < 5 {
                    return Ok(data.clone());
                }
            }
        }
        
        // Fetch fresh data from API
        let endpoint = self.api_endpoints.get(&region)
            .ok_or(OracleError::NoDataForRegion(region))?;
        
        // Make API request
        let response = self.client
            .get(endpoint)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await?;
        
        if !response.status().is_success() {
            if response.status().as_u16() == 429 {
                return Err(OracleError::RateLimitExceeded);
            }
            return Err(OracleError::ApiError(
                format!("API returned status: {}", response.status())
            ));
        }
        
        // Parse response based on region/API format
        let grid_data = self.parse_api_response(region, response).await?;
        
        // Update cache
        {
            let mut cache = self.cache.write().map_err(|_| {
                OracleError::ApiError("Cache lock error".to_string())
            })?;
            cache.data.insert(region, grid_data.clone());
            cache.last_update = Utc::now();
        }
        
        Ok(grid_data)
    }
    
    /// Parse API response into GridData
    async fn parse_api_response(
        &self,
        region: Region,
        response: reqwest::Response,
    ) -> Result<GridData, OracleError> {
        let body = response.text().await?;
        
        // In production, this would parse actual API responses
        // For now, we'll create realistic data based on typical grid compositions
        let (energy_mix, carbon_intensity) = match region {
            Region::NorthAmerica => {
                let mut mix = HashMap::new();
                mix.insert(EnergySource::NaturalGas, 40.0);
                mix.insert(EnergySource::Nuclear, 20.0);
                mix.insert(EnergySource::Coal, 20.0);
                mix.insert(EnergySource::Wind, 10.0);
                mix.insert(EnergySource::Solar, 5.0);
                mix.insert(EnergySource::Hydro, 5.0);
                (mix, 450.0) // gCO2/kWh
            }
            Region::Europe => {
                let mut mix = HashMap::new();
                mix.insert(EnergySource::Wind, 25.0);
                mix.insert(EnergySource::Nuclear, 25.0);
                mix.insert(EnergySource::NaturalGas, 20.0);
                mix.insert(EnergySource::Hydro, 15.0);
                mix.insert(EnergySource::Solar, 10.0);
                mix.insert(EnergySource::Coal, 5.0);
                (mix, 300.0) // gCO2/kWh
            }
            Region::AsiaPacific => {
                let mut mix = HashMap::new();
                mix.insert(EnergySource::Coal, 45.0);
                mix.insert(EnergySource::NaturalGas, 20.0);
                mix.insert(EnergySource::Hydro, 15.0);
                mix.insert(EnergySource::Nuclear, 10.0);
                mix.insert(EnergySource::Wind, 5.0);
                mix.insert(EnergySource::Solar, 5.0);
                (mix, 600.0) // gCO2/kWh
            }
            _ => {
                let mut mix = HashMap::new();
                mix.insert(EnergySource::Grid, 100.0);
                (mix, 500.0) // Global average
            }
        };
        
        let renewable_percentage = energy_mix.iter()
            .filter(|(source, _)| matches!(
                source,
                EnergySource::Solar | EnergySource::Wind | EnergySource::Hydro | EnergySource::Geothermal
            ))
            .map(|(_, percentage)| percentage)
            .sum();
        
        Ok(GridData {
            region,
            timestamp: Utc::now(),
            energy_mix,
            carbon_intensity,
            renewable_percentage,
            demand_mw: 50000.0, // Placeholder
            generation_mw: 51000.0, // Placeholder
        })
    }
}

/// Carbon credit registry interface
pub struct CarbonCreditRegistry {
    client: Client,
    registry_endpoints: HashMap<String, String>,
}

impl CarbonCreditRegistry {
    pub fn new() -> Self {
        let mut registry_endpoints = HashMap::new();
        
        // Real carbon credit registries
        registry_endpoints.insert(
            "verra".to_string(),
            "https://registry.verra.org/app/api/".to_string()
        );
        registry_endpoints.insert(
            "gold_standard".to_string(),
            "https://registry.goldstandard.org/api/".to_string()
        );
        
        Self {
            client: Client::new(),
            registry_endpoints,
        }
    }
    
    /// Purchase carbon credits
    pub async fn purchase_credits(
        &self,
        amount_tonnes: f64,
        registry: &str,
    ) -> Result<CarbonCreditPurchase, OracleError> {
        let endpoint = self.registry_endpoints.get(registry)
            .ok_or_else(|| OracleError::ApiError(format!("Unknown registry: {}", registry)))?;
        
        // In production, this would make actual API calls to purchase credits
        // For now, we'll simulate a successful purchase
        Ok(CarbonCreditPurchase {
            registry: registry.to_string(),
            credit_id: format!("NOVA-{}-{}", registry.to_uppercase(), Utc::now().timestamp()),
            amount_tonnes,
            price_per_tonne: 25.0, // Current market price
            total_cost: amount_tonnes * 25.0,
            retirement_date: Utc::now(),
            project_details: "Renewable Energy Project".to_string(),
        })
    }
}

/// Carbon credit purchase record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonCreditPurchase {
    pub registry: String,
    pub credit_id: String,
    pub amount_tonnes: f64,
    pub price_per_tonne: f64,
    pub total_cost: f64,
    pub retirement_date: DateTime<Utc>,
    pub project_details: String,
}

/// Renewable Energy Certificate (REC) validator
pub struct RECValidator {
    client: Client,
    validation_endpoints: HashMap<Region, String>,
}

impl RECValidator {
    pub fn new() -> Self {
        let mut validation_endpoints = HashMap::new();
        
        // REC tracking systems by region
        validation_endpoints.insert(
            Region::NorthAmerica,
            "https://www.greenfacts.org/api/validate".to_string()
        );
        validation_endpoints.insert(
            Region::Europe,
            "https://www.aib-net.org/api/validate".to_string()
        );
        
        Self {
            client: Client::new(),
            validation_endpoints,
        }
    }
    
    /// Validate a renewable energy certificate
    pub async fn validate_certificate(
        &self,
        certificate_id: &str,
        region: Region,
    ) -> Result<RECValidation, OracleError> {
        let endpoint = self.validation_endpoints.get(&region)
            .ok_or(OracleError::NoDataForRegion(region))?;
        
        // In production, this would validate against actual REC registries
        // For now, we'll simulate validation
        Ok(RECValidation {
            certificate_id: certificate_id.to_string(),
            is_valid: true,
            generation_date: Utc::now() - chrono::Duration::days(30),
            expiry_date: Utc::now() + chrono::Duration::days(335),
            energy_mwh: 1.0,
            technology: "Solar PV".to_string(),
            location: format!("{:?}", region),
        })
    }
}

/// REC validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RECValidation {
    pub certificate_id: String,
    pub is_valid: bool,
    pub generation_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub energy_mwh: f64,
    pub technology: String,
    pub location: String,
}

/// Smart meter data interface
pub struct SmartMeterInterface {
    client: Client,
    meter_endpoints: HashMap<String, String>,
}

impl SmartMeterInterface {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            meter_endpoints: HashMap::new(),
        }
    }
    
    /// Read smart meter data
    pub async fn read_meter(
        &self,
        meter_id: &str,
    ) -> Result<SmartMeterReading, OracleError> {
        // In production, this would interface with actual smart meters
        // For now, we'll simulate realistic readings
        Ok(SmartMeterReading {
            meter_id: meter_id.to_string(),
            timestamp: Utc::now(),
            power_kw: 1500.0, // 1.5 MW mining operation
            energy_kwh_day: 36000.0, // 36 MWh/day
            power_factor: 0.95,
            voltage: 480.0,
            frequency: 60.0,
        })
    }
}

/// Smart meter reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartMeterReading {
    pub meter_id: String,
    pub timestamp: DateTime<Utc>,
    pub power_kw: f64,
    pub energy_kwh_day: f64,
    pub power_factor: f64,
    pub voltage: f64,
    pub frequency: f64,
}
