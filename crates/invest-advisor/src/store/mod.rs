//! Record Store
//!
//! Persistence for sessions, transcript messages and finalized portfolios.
//! Records are append-only: there are no update or delete operations.

mod memory;

pub use memory::MemoryRecordStore;

use agent_core::{Role, SessionId};
use async_trait::async_trait;

use crate::error::Result;
use crate::model::{MessageRecord, NewPortfolio, PortfolioRecord, SessionRecord};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Resolve a client token to a session, creating the record on first use.
    /// A blank or missing token yields a fresh session.
    async fn ensure_session(&self, token: Option<&str>) -> Result<SessionId>;

    /// Append one transcript entry
    async fn append_message(&self, session: &SessionId, role: Role, content: &str) -> Result<()>;

    /// Insert a finalized portfolio
    async fn create_portfolio(
        &self,
        session: &SessionId,
        portfolio: NewPortfolio,
    ) -> Result<PortfolioRecord>;

    async fn session(&self, session: &SessionId) -> Result<Option<SessionRecord>>;

    /// Transcript in insertion order
    async fn messages(&self, session: &SessionId) -> Result<Vec<MessageRecord>>;

    async fn portfolios(&self, session: &SessionId) -> Result<Vec<PortfolioRecord>>;

    /// Backend name for health reporting
    fn name(&self) -> &str;
}
