use super::{NOVA_BLOCK_REWARD, HALVING_INTERVAL, MAX_HALVINGS, ENV_BONUS_RENEWABLE, ENV_BONUS_EFFICIENCY, ENV_BONUS_MAX_TOTAL};

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentalProfile {
    pub renewable_percentage: f64,  // 0.0 to 1.0
    pub efficiency_score: f64,      // 0.0 to 1.0
    pub verified: bool,
    pub rec_coverage: f64,          // Renewable Energy Certificate coverage
}

impl Default for EnvironmentalProfile {
    fn default() -> Self {
        Self {
            renewable_percentage: 0.0,
            efficiency_score: 0.0,
            verified: false,
            rec_coverage: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MiningReward {
    pub base_reward: u64,
    pub environmental_bonus: u64,
    pub total_reward: u64,
}

/// Calculate the base block reward considering halvings
pub fn calculate_base_reward(block_height: u64) -> u64 {
    // Calculate how many halvings have occurred
    let halvings = (block_height / HALVING_INTERVAL) as u32;
    
    // Cap at maximum halvings to prevent underflow
    if halvings >= MAX_HALVINGS {
        return 0;
    }
    
    // Calculate reward: initial_reward / 2^halvings
    // Convert to satoshis (1 NOVA = 100_000_000 satoshis)
    let initial_reward_satoshis = NOVA_BLOCK_REWARD * 100_000_000;
    initial_reward_satoshis >> halvings
}

/// Calculate environmental bonus based on miner's environmental profile
pub fn calculate_environmental_bonus(base_reward: u64, profile: &EnvironmentalProfile) -> u64 {
    if !profile.verified {
        return 0;
    }
    
    let mut bonus_multiplier = 0.0;
    
    // Renewable energy bonus (up to 20%)
    if profile.renewable_percentage > 0.0 {
        bonus_multiplier += ENV_BONUS_RENEWABLE * profile.renewable_percentage;
    }
    
    // Efficiency bonus (up to 10%)
    if profile.efficiency_score > 0.0 {
        bonus_multiplier += ENV_BONUS_EFFICIENCY * profile.efficiency_score;
    }
    
    // Additional bonus for REC coverage
    if profile.rec_coverage > 0.0 {
        bonus_multiplier += 0.05 * profile.rec_coverage; // Up to 5% for full REC coverage
    }
    
    // Cap total bonus at maximum
    bonus_multiplier = bonus_multiplier.min(ENV_BONUS_MAX_TOTAL);
    
    (base_reward as f64 * bonus_multiplier) as u64
}

/// Calculate total mining reward including environmental bonuses
pub fn calculate_mining_reward(block_height: u64, environmental_profile: &EnvironmentalProfile) -> MiningReward {
    let base_reward = calculate_base_reward(block_height);
    let environmental_bonus = calculate_environmental_bonus(base_reward, environmental_profile);
    
    MiningReward {
        base_reward,
        environmental_bonus,
        total_reward: base_reward + environmental_bonus,
    }
}

/// Get the current subsidy era (which halving period we're in)
pub fn get_subsidy_era(block_height: u64) -> u32 {
    (block_height / HALVING_INTERVAL) as u32
}

/// Calculate total NOVA issued up to a given block height
pub fn calculate_total_issued(block_height: u64) -> u64 {
    let mut total = 0u64;
    let mut current_height = 0u64;
    let mut era = 0u32;
    
    while current_height < block_height && era < MAX_HALVINGS {
        let era_end = ((era + 1) as u64) * HALVING_INTERVAL;
        let blocks_in_era = if block_height < era_end {
            block_height - current_height
        } else {
            era_end - current_height
        };
        
        let reward_per_block = calculate_base_reward(current_height);
        total += blocks_in_era * reward_per_block;
        
        current_height = era_end;
        era += 1;
    }
    
    total
}
