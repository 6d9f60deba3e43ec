//! Test doubles shared by the unit tests

use agent_core::{Role, SessionId};
use async_trait::async_trait;

use crate::error::{AdvisorError, Result};
use crate::model::{MessageRecord, NewPortfolio, PortfolioRecord, SessionRecord};
use crate::store::RecordStore;

/// Store that hands out sessions but rejects every write
pub struct RejectingStore;

#[async_trait]
impl RecordStore for RejectingStore {
    async fn ensure_session(&self, token: Option<&str>) -> Result<SessionId> {
        Ok(SessionId::resolve(token))
    }

    async fn append_message(&self, _: &SessionId, _: Role, _: &str) -> Result<()> {
        Err(AdvisorError::Store("disk full".into()))
    }

    async fn create_portfolio(&self, _: &SessionId, _: NewPortfolio) -> Result<PortfolioRecord> {
        Err(AdvisorError::Store("disk full".into()))
    }

    async fn session(&self, _: &SessionId) -> Result<Option<SessionRecord>> {
        Ok(None)
    }

    async fn messages(&self, _: &SessionId) -> Result<Vec<MessageRecord>> {
        Ok(Vec::new())
    }

    async fn portfolios(&self, _: &SessionId) -> Result<Vec<PortfolioRecord>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "rejecting"
    }
}

/// Store whose sessions cannot be opened
pub struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn ensure_session(&self, _: Option<&str>) -> Result<SessionId> {
        Err(AdvisorError::Store("connection refused".into()))
    }

    async fn append_message(&self, _: &SessionId, _: Role, _: &str) -> Result<()> {
        Err(AdvisorError::Store("connection refused".into()))
    }

    async fn create_portfolio(&self, _: &SessionId, _: NewPortfolio) -> Result<PortfolioRecord> {
        Err(AdvisorError::Store("connection refused".into()))
    }

    async fn session(&self, _: &SessionId) -> Result<Option<SessionRecord>> {
        Ok(None)
    }

    async fn messages(&self, _: &SessionId) -> Result<Vec<MessageRecord>> {
        Ok(Vec::new())
    }

    async fn portfolios(&self, _: &SessionId) -> Result<Vec<PortfolioRecord>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
