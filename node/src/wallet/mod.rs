//! Node Wallet Module
//!
//! This module provides an interface to the wallet functionality, allowing the
//! node to manage keys and create transactions.

pub mod manager;

pub use manager::WalletManager; 