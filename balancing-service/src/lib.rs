//! Balancing Service - cross-ledger balancing report for coffee deliveries.

pub mod config;
pub mod models;
pub mod services;
pub mod startup;
