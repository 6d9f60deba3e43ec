//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `agent_core::Tool` for the advisor.

mod update_portfolio;

pub use update_portfolio::{UPDATE_PORTFOLIO_TOOL, UpdatePortfolioTool};
