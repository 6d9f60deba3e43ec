//! Investment strategy calculations

pub mod allocation;
pub mod distribution;

pub use allocation::{Allocation, EquitySplit, RiskClass, compute_allocation};
pub use distribution::{DEFAULT_ANCHOR, StockDistribution, StockShare, distribute_direct_stocks};
