//! Metrics Privacy Security Tests
//!
//! Tests for Prometheus metrics privacy filtering
//! 
//! This test suite validates the metrics privacy framework that prevents
//! information leakage through exported Prometheus metrics. It ensures that
//! sensitive data (IP addresses, addresses, balances) is properly filtered.
//!
//! Test Coverage:
//! - IP address sanitization
//! - Peer ID hashing
//! - Address redaction
//! - Transaction detail filtering
//! - Wallet information protection
//! - Privacy level enforcement

use node::metrics::{MetricsPrivacyFilter, MetricsPrivacyLevel, MetricsPrivacyConfig};

#[test]
fn test_privacy_config_defaults() {
    // SECURITY TEST: Verify default privacy settings are secure
    
    assert_eq!(
        MetricsPrivacyConfig::DEFAULT_PRIVACY_LEVEL,
        MetricsPrivacyLevel::Standard,
        "Default privacy level should be Standard (not Full)"
    );
    
    assert_eq!(
        MetricsPrivacyConfig::INCLUDE_IP_ADDRESSES,
        false,
        "IP addresses should not be included by default"
    );
    
    assert_eq!(
        MetricsPrivacyConfig::INCLUDE_PEER_IDS,
        false,
        "Peer IDs should not be included by default"
    );
    
    assert_eq!(
        MetricsPrivacyConfig::INCLUDE_TRANSACTION_DETAILS,
        false,
        "Transaction details should not be included by default"
    );
    
    assert_eq!(
        MetricsPrivacyConfig::INCLUDE_WALLET_INFO,
        false,
        "Wallet info should NEVER be included"
    );
    
    println!("✓ Default privacy settings are secure");
}

#[test]
fn test_ip_address_sanitization() {
    // SECURITY TEST: IP addresses must be hashed, not exposed
    
    let filter = MetricsPrivacyFilter::standard();
    let ip: std::net::IpAddr = "192.168.1.100".parse().unwrap();
    
    let sanitized = filter.sanitize_ip(&ip);
    
    // Must not contain actual IP
    assert!(!sanitized.contains("192.168"), "Must not contain actual IP");
    assert!(!sanitized.contains("1.100"), "Must not contain IP parts");
    
    // Should be hashed
    assert!(sanitized.starts_with("ip_"), "Should have ip_ prefix");
    assert!(sanitized.len() > 8, "Should include hash");
    
    println!("✓ IP sanitized: {} → {}", ip, sanitized);
}

#[test]
fn test_peer_id_hashing() {
    // SECURITY TEST: Peer IDs must be hashed to prevent tracking
    
    let filter = MetricsPrivacyFilter::standard();
    let peer_id = "12D3KooWExample123456789";
    
    let sanitized = filter.sanitize_peer_id(peer_id);
    
    // Must not contain actual peer ID
    assert!(!sanitized.contains("12D3"), "Must not contain actual peer ID");
    assert!(!sanitized.contains("Example"), "Must not contain peer ID parts");
    
    // Should be hashed
    assert!(sanitized.starts_with("peer_"), "Should have peer_ prefix");
    
    println!("✓ Peer ID sanitized: {} → {}", peer_id, sanitized);
}

#[test]
fn test_address_redaction() {
    // SECURITY TEST: Addresses must NEVER be exposed
    
    let filter_standard = MetricsPrivacyFilter::standard();
    let filter_minimal = MetricsPrivacyFilter::new(MetricsPrivacyLevel::Minimal);
    let address = "nova1abcdef123456789";
    
    let sanitized_standard = filter_standard.sanitize_address(address);
    let sanitized_minimal = filter_minimal.sanitize_address(address);
    
    // Both should redact addresses completely
    assert_eq!(sanitized_standard, "redacted", "Standard level must redact addresses");
    assert_eq!(sanitized_minimal, "redacted", "Minimal level must redact addresses");
    
    assert!(!sanitized_standard.contains("nova1"), "Must not contain address");
    assert!(!sanitized_minimal.contains("abcdef"), "Must not contain address parts");
    
    println!("✓ Addresses completely redacted at all privacy levels");
}

#[test]
fn test_transaction_detail_filtering() {
    // SECURITY TEST: Transaction details must be aggregated only
    
    let filter = MetricsPrivacyFilter::standard();
    let tx_hash = "a1b2c3d4e5f6...";
    
    let sanitized = filter.sanitize_transaction(tx_hash);
    
    // Should not contain actual transaction hash
    assert_eq!(sanitized, "tx_aggregate", "Should only show aggregate");
    assert!(!sanitized.contains("a1b2c3"), "Must not contain tx hash");
    
    println!("✓ Transaction details filtered to aggregates only");
}

#[test]
fn test_wallet_balance_protection() {
    // SECURITY TEST: Wallet balances must never be exposed
    
    let filter = MetricsPrivacyFilter::standard();
    let balance = 1_000_000_000u64; // 10 NOVA
    
    let sanitized = filter.sanitize_balance(balance);
    
    // Must be redacted
    assert_eq!(sanitized, "redacted", "Balance must be redacted");
    assert!(!sanitized.contains("1000000000"), "Must not show actual balance");
    
    println!("✓ Wallet balances completely protected");
}

#[test]
fn test_sensitive_metric_blocking() {
    // SECURITY TEST: Sensitive metrics must not be exported
    
    let filter = MetricsPrivacyFilter::standard();
    
    // Sensitive metrics that should be blocked
    let sensitive = vec![
        "wallet_balance",
        "wallet_address_count",
        "transaction_amount_histogram",
        "peer_ip_address_list",
        "user_agent_string",
        "connection_ip_map",
    ];
    
    for metric in &sensitive {
        assert!(
            !filter.should_export_metric(metric),
            "{} should be blocked",
            metric
        );
    }
    
    // Safe aggregate metrics that should be allowed
    let safe = vec![
        "total_blocks",
        "total_transactions",
        "count_peers",
        "avg_response_time",
    ];
    
    for metric in &safe {
        assert!(
            filter.should_export_metric(metric),
            "{} should be allowed",
            metric
        );
    }
    
    println!("✓ Sensitive metrics blocked, safe metrics allowed");
}

#[test]
fn test_privacy_level_hierarchy() {
    // SECURITY TEST: Privacy levels provide increasing protection
    
    let full = MetricsPrivacyFilter::new(MetricsPrivacyLevel::Full);
    let standard = MetricsPrivacyFilter::standard();
    let minimal = MetricsPrivacyFilter::new(MetricsPrivacyLevel::Minimal);
    
    let ip: std::net::IpAddr = "10.0.0.1".parse().unwrap();
    
    let full_result = full.sanitize_ip(&ip);
    let standard_result = standard.sanitize_ip(&ip);
    let minimal_result = minimal.sanitize_ip(&ip);
    
    println!("\nPrivacy Level Comparison:");
    println!("  Full (dev only): {}", full_result);
    println!("  Standard (production): {}", standard_result);
    println!("  Minimal (max privacy): {}", minimal_result);
    
    // Full shows IP (dev only)
    assert_eq!(full_result, "10.0.0.1");
    
    // Standard hashes IP
    assert!(standard_result.starts_with("ip_"));
    assert_ne!(standard_result, full_result);
    
    // Minimal redacts completely
    assert_eq!(minimal_result, "redacted");
    
    println!("\n✓ Privacy levels provide increasing protection");
}

#[test]
fn test_documentation() {
    // This test exists to document the security fix
    
    println!("\n=== SECURITY FIX DOCUMENTATION ===");
    println!("Vulnerability: P2-011 Prometheus Metrics Information Leak");
    println!("Impact: Privacy breach, network topology exposure");
    println!("Fix: Comprehensive metrics privacy framework");
    println!("");
    println!("Privacy Framework:");
    println!("  - MetricsPrivacyFilter for data sanitization");
    println!("  - 3 privacy levels: Full, Standard, Minimal");
    println!("  - Configurable filtering rules");
    println!("");
    println!("Data Protection:");
    println!("  ✓ IP addresses → Hashed (ip_abc123...)");
    println!("  ✓ Peer IDs → Hashed (peer_xyz789...)");
    println!("  ✓ Addresses → Redacted (never exposed)");
    println!("  ✓ Balances → Redacted (never exposed)");
    println!("  ✓ Tx details → Aggregates only");
    println!("");
    println!("Privacy Levels:");
    println!("  Full: All data (development only)");
    println!("  Standard: Hashing + filtering (production default)");
    println!("  Minimal: Maximum redaction (high privacy)");
    println!("");
    println!("Sensitive Metrics Blocked:");
    println!("  - wallet_balance");
    println!("  - wallet_address");
    println!("  - peer_ip_address");
    println!("  - transaction_amount");
    println!("  - connection_ip");
    println!("  - user_agent");
    println!("");
    println!("Safe Metrics Allowed:");
    println!("  - total_blocks");
    println!("  - total_transactions");
    println!("  - count_peers");
    println!("  - avg_response_time");
    println!("");
    println!("Test Coverage: 8 security-focused test cases");
    println!("Status: PROTECTED - Metrics privacy enforced");
    println!("=====================================\n");
}

