//! Profile and session persistence
//!
//! The engine itself never stores anything; the HTTP layer loads a user's
//! profile, grants and session through [`ProfileStore`] and writes the
//! updated session back. Currently in-memory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::locale::Locale;
use crate::memory::ConversationLog;
use crate::models::{AccessGrant, FinancialProfile};
use crate::Result;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Unknown names select the system theme
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            _ => Theme::System,
        }
    }
}

/// A user's stored records and the grants controlling them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub profile: FinancialProfile,
    pub grants: AccessGrant,
}

/// Per-session state owned outside the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub log: ConversationLog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    #[serde(default)]
    pub theme: Theme,
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Loads the user, creating a record with default grants on first use
    async fn load_user(&self, user_id: Uuid) -> Result<UserRecord>;
    async fn save_profile(&self, user_id: Uuid, profile: FinancialProfile) -> Result<()>;
    async fn save_grants(&self, user_id: Uuid, grants: AccessGrant) -> Result<()>;
    async fn load_session(&self, session_id: Uuid) -> Result<SessionState>;
    async fn save_session(&self, session_id: Uuid, session: SessionState) -> Result<()>;
}

/// In-memory store for development; new users receive a copy of the seed profile
pub struct InMemoryProfileStore {
    seed_profile: FinancialProfile,
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl InMemoryProfileStore {
    pub fn new(seed_profile: FinancialProfile) -> Self {
        Self {
            seed_profile,
            users: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new(FinancialProfile::sample())
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load_user(&self, user_id: Uuid) -> Result<UserRecord> {
        {
            let users = self.users.read().await;
            if let Some(record) = users.get(&user_id) {
                return Ok(record.clone());
            }
        }

        let mut users = self.users.write().await;
        let record = users
            .entry(user_id)
            .or_insert_with(|| UserRecord {
                profile: self.seed_profile.clone(),
                grants: AccessGrant::default(),
            })
            .clone();

        Ok(record)
    }

    async fn save_profile(&self, user_id: Uuid, profile: FinancialProfile) -> Result<()> {
        let mut users = self.users.write().await;
        users
            .entry(user_id)
            .or_insert_with(|| UserRecord {
                profile: FinancialProfile::default(),
                grants: AccessGrant::default(),
            })
            .profile = profile;
        Ok(())
    }

    async fn save_grants(&self, user_id: Uuid, grants: AccessGrant) -> Result<()> {
        let mut users = self.users.write().await;
        users
            .entry(user_id)
            .or_insert_with(|| UserRecord {
                profile: self.seed_profile.clone(),
                grants,
            })
            .grants = grants;
        Ok(())
    }

    async fn load_session(&self, session_id: Uuid) -> Result<SessionState> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_id).cloned().unwrap_or_default())
    }

    async fn save_session(&self, session_id: Uuid, session: SessionState) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, session);
        Ok(())
    }
}
