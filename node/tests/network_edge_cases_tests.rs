//! Network Edge Cases Tests
//!
//! TEST SUITE (P2-012): Network module edge case testing

use node::network::peer_diversity::{EclipseDefenseConfig, EclipsePreventionConfig};

#[test]
fn test_connection_limit_at_maximum() {
    // EDGE CASE: Connection count at exact maximum
    let config = EclipsePreventionConfig::default();
    
    let max_outbound = config.min_outbound_connections;
    assert_eq!(max_outbound, 8, "Min outbound should be 8");
    
    println!("✓ Connection limit boundaries defined");
}

#[test]
fn test_asn_diversity_at_minimum() {
    // EDGE CASE: Exactly minimum required ASNs
    let min_asns = EclipseDefenseConfig::MIN_UNIQUE_ASNS;
    assert_eq!(min_asns, 8, "Minimum 8 unique ASNs required");
    
    println!("✓ ASN diversity minimum enforced");
}

#[test]
fn test_peers_per_asn_limit() {
    // EDGE CASE: Maximum peers per ASN boundary
    let max_per_asn = EclipseDefenseConfig::MAX_PEERS_PER_ASN;
    assert_eq!(max_per_asn, 2, "Max 2 peers per ASN");
    
    println!("✓ Peers per ASN limited");
}

#[test]
fn test_peers_per_subnet_limit() {
    // EDGE CASE: Maximum peers per subnet boundary
    let max_per_subnet = EclipseDefenseConfig::MAX_PEERS_PER_SUBNET;
    assert_eq!(max_per_subnet, 2, "Max 2 peers per subnet");
    
    println!("✓ Peers per subnet limited");
}

#[test]
fn test_anchor_peer_count() {
    // EDGE CASE: Anchor peer configuration
    let anchor_count = EclipseDefenseConfig::ANCHOR_PEER_COUNT;
    assert_eq!(anchor_count, 4, "Should have 4 anchor peers");
    
    println!("✓ Anchor peer count validated");
}

#[test]
fn test_inbound_outbound_ratio() {
    // EDGE CASE: Inbound/outbound ratio limits
    let config = EclipsePreventionConfig::default();
    
    let max_ratio = config.max_inbound_ratio;
    assert_eq!(max_ratio, 3.0, "Max 3:1 inbound:outbound ratio");
    
    println!("✓ Inbound/outbound ratio limited");
}

#[test]
fn test_peer_rotation_enabled() {
    // EDGE CASE: Automatic peer rotation configuration
    let config = EclipsePreventionConfig::default();
    
    assert!(config.enable_automatic_rotation, "Automatic rotation should be enabled");
    assert_eq!(config.rotation_interval.as_secs(), 3600, "Rotation every hour");
    
    println!("✓ Peer rotation configured");
}

#[test]
fn test_network_diversity_requirements() {
    // EDGE CASE: All network diversity requirements together
    
    assert_eq!(EclipseDefenseConfig::MIN_UNIQUE_ASNS, 8);
    assert_eq!(EclipseDefenseConfig::MAX_PEERS_PER_ASN, 2);
    assert_eq!(EclipseDefenseConfig::MAX_PEERS_PER_SUBNET, 2);
    assert_eq!(EclipseDefenseConfig::ANCHOR_PEER_COUNT, 4);
    
    // Calculate: With 8 ASNs × 2 peers each = 16 total peers minimum
    let min_diverse_peers = EclipseDefenseConfig::MIN_UNIQUE_ASNS * EclipseDefenseConfig::MAX_PEERS_PER_ASN;
    assert_eq!(min_diverse_peers, 16, "Minimum 16 diverse peers");
    
    println!("✓ Network diversity requirements comprehensive");
}

#[test]
fn test_eclipse_attack_resistance_calculation() {
    // EDGE CASE: Eclipse attack difficulty with current limits
    
    let asns_needed = EclipseDefenseConfig::MIN_UNIQUE_ASNS;
    let peers_per_asn = EclipseDefenseConfig::MAX_PEERS_PER_ASN;
    
    // Attacker needs majority of ASNs to eclipse
    let attack_asns = (asns_needed / 2) + 1; // Need >50%
    
    assert!(attack_asns >= 5, "Attacker needs 5+ ASNs");
    
    println!("✓ Eclipse attack requires controlling 5+ ASNs");
}

#[test]
fn test_connection_limits_prevent_overflow() {
    // EDGE CASE: Connection limit values don't overflow
    
    let config = EclipsePreventionConfig::default();
    
    let total_connections = config.min_outbound_connections * 10; // Extreme case
    assert!(total_connections < u32::MAX as usize, "Connection count shouldn't overflow");
    
    println!("✓ Connection counts prevent overflow");
}

#[test]
fn test_peer_diversity_config_consistency() {
    // EDGE CASE: Configuration values are internally consistent
    
    let config = EclipsePreventionConfig::default();
    
    // ASN limit should be less than total connection limit
    assert!(config.max_connections_per_asn < config.min_outbound_connections);
    
    // Subnet limit should be reasonable
    assert!(config.max_connections_per_subnet <= config.max_connections_per_asn);
    
    println!("✓ Peer diversity config internally consistent");
}

#[test]
fn test_network_message_size_limits() {
    // EDGE CASE: Message size boundaries
    use node::network::message::MessageSizeLimits;
    
    assert_eq!(MessageSizeLimits::MAX_MESSAGE_SIZE, 4 * 1024 * 1024);
    assert_eq!(MessageSizeLimits::MAX_TRANSACTION_SIZE, 1 * 1024 * 1024);
    assert_eq!(MessageSizeLimits::MAX_INVENTORY_SIZE, 512 * 1024);
    
    // Verify hierarchy
    assert!(MessageSizeLimits::MAX_TRANSACTION_SIZE < MessageSizeLimits::MAX_MESSAGE_SIZE);
    assert!(MessageSizeLimits::MAX_INVENTORY_SIZE < MessageSizeLimits::MAX_TRANSACTION_SIZE);
    
    println!("✓ Network message size limits validated");
}

