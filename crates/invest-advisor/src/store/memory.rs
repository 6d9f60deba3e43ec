//! In-process record store

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use agent_core::{Role, SessionId};
use async_trait::async_trait;
use chrono::Utc;

use super::RecordStore;
use crate::error::{AdvisorError, Result};
use crate::model::{MessageRecord, NewPortfolio, PortfolioRecord, SessionRecord};

#[derive(Default)]
struct Tables {
    sessions: BTreeMap<SessionId, SessionRecord>,
    messages: Vec<MessageRecord>,
    portfolios: Vec<PortfolioRecord>,
    next_message_id: u64,
    next_portfolio_id: u64,
}

impl Tables {
    fn require_session(&self, session: &SessionId) -> Result<()> {
        if self.sessions.contains_key(session) {
            Ok(())
        } else {
            Err(AdvisorError::Store(format!("unknown session {session}")))
        }
    }
}

/// Record store held in memory. One lock guards every table, so all writes
/// are serialized.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AdvisorError::Store("record store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AdvisorError::Store("record store lock poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn ensure_session(&self, token: Option<&str>) -> Result<SessionId> {
        let id = SessionId::resolve(token);
        let mut tables = self.write()?;
        if !tables.sessions.contains_key(&id) {
            tracing::debug!(session = %id, "Creating session");
            tables.sessions.insert(id.clone(), SessionRecord::new(id.clone()));
        }
        Ok(id)
    }

    async fn append_message(&self, session: &SessionId, role: Role, content: &str) -> Result<()> {
        let mut tables = self.write()?;
        tables.require_session(session)?;

        tables.next_message_id += 1;
        let record = MessageRecord {
            id: tables.next_message_id,
            session_id: session.clone(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        tables.messages.push(record);
        Ok(())
    }

    async fn create_portfolio(
        &self,
        session: &SessionId,
        portfolio: NewPortfolio,
    ) -> Result<PortfolioRecord> {
        let mut tables = self.write()?;
        tables.require_session(session)?;

        tables.next_portfolio_id += 1;
        let record = PortfolioRecord {
            id: tables.next_portfolio_id,
            session_id: session.clone(),
            portfolio,
            created_at: Utc::now(),
        };
        tables.portfolios.push(record.clone());
        tracing::info!(session = %session, portfolio_id = record.id, "Portfolio stored");
        Ok(record)
    }

    async fn session(&self, session: &SessionId) -> Result<Option<SessionRecord>> {
        Ok(self.read()?.sessions.get(session).cloned())
    }

    async fn messages(&self, session: &SessionId) -> Result<Vec<MessageRecord>> {
        Ok(self
            .read()?
            .messages
            .iter()
            .filter(|m| &m.session_id == session)
            .cloned()
            .collect())
    }

    async fn portfolios(&self, session: &SessionId) -> Result<Vec<PortfolioRecord>> {
        Ok(self
            .read()?
            .portfolios
            .iter()
            .filter(|p| &p.session_id == session)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
