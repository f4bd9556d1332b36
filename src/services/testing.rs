//! In-memory collaborators with call counters, shared by unit and router tests.
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::access::{Subscription, SubscriptionStatus, SubscriptionStore};
use crate::services::auth::identity::{Identity, IdentityProvider, ProviderError, VerifiedToken};
use crate::services::auth::resolver::{Role, User, UserDirectory};
use crate::services::channels::{ChannelId, Sport, SportCatalog};
use crate::services::messages::{Message, MessageStore};

pub fn identity(subject_id: &str) -> Identity {
    Identity {
        subject_id: subject_id.to_string(),
        email: None,
        expires_at: u64::MAX,
    }
}

pub fn user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
        role,
    }
}

fn backend_down() -> RepoError {
    RepoError::Db(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
pub struct FakeIdentityProvider {
    tokens: HashMap<String, VerifiedToken>,
    unavailable: HashSet<String>,
    hanging: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn with_token(mut self, token: &str, subject_id: &str, email: Option<&str>) -> Self {
        self.tokens.insert(
            token.to_string(),
            VerifiedToken {
                subject_id: subject_id.to_string(),
                email: email.map(str::to_string),
                expires_at: u64::MAX,
            },
        );
        self
    }

    pub fn with_unavailable(mut self, token: &str) -> Self {
        self.unavailable.insert(token.to_string());
        self
    }

    /// Verification of `token` never completes.
    pub fn with_hanging(mut self, token: &str) -> Self {
        self.hanging.insert(token.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hanging.contains(token) {
            std::future::pending::<()>().await;
        }
        if self.unavailable.contains(token) {
            return Err(ProviderError::Unavailable("connection refused".into()));
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("unknown token".into()))
    }
}

#[derive(Default)]
pub struct FakeUserDirectory {
    users: HashMap<String, User>,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeUserDirectory {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, id: &str, role: Role) -> Self {
        self.users.insert(id.to_string(), user(id, role));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn find_user_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(backend_down());
        }
        Ok(self.users.get(id).cloned())
    }
}

#[derive(Default)]
pub struct FakeSportCatalog {
    sports: Vec<Sport>,
    failing: bool,
    exists_calls: AtomicUsize,
}

impl FakeSportCatalog {
    pub fn with_sports(sports: &[(i64, &str)]) -> Self {
        Self {
            sports: sports
                .iter()
                .map(|(id, name)| Sport {
                    id: *id,
                    name: name.to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SportCatalog for FakeSportCatalog {
    async fn sport_exists(&self, sport_id: i64) -> RepoResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(backend_down());
        }
        Ok(self.sports.iter().any(|s| s.id == sport_id))
    }

    async fn list_sports(&self) -> RepoResult<Vec<Sport>> {
        if self.failing {
            return Err(backend_down());
        }
        Ok(self.sports.clone())
    }
}

#[derive(Default)]
pub struct FakeSubscriptionStore {
    rows: HashMap<(String, String), SubscriptionStatus>,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeSubscriptionStore {
    pub fn with(mut self, user_id: &str, channel: &str, status: SubscriptionStatus) -> Self {
        self.rows
            .insert((user_id.to_string(), channel.to_string()), status);
        self
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionStore for FakeSubscriptionStore {
    async fn find_subscription(
        &self,
        user_id: &str,
        channel: &ChannelId,
    ) -> RepoResult<Option<Subscription>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(backend_down());
        }
        // Keyed by sport id, like the Postgres store.
        let Some(sport_id) = channel.sport_id() else {
            return Ok(None);
        };
        let key = (user_id.to_string(), sport_id.to_string());
        Ok(self.rows.get(&key).map(|status| Subscription {
            user_id: user_id.to_string(),
            channel_id: ChannelId::from(sport_id),
            status: Some(*status),
        }))
    }
}

#[derive(Default)]
pub struct FakeMessageStore {
    messages: Mutex<Vec<Message>>,
}

impl FakeMessageStore {
    pub fn stored(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageStore for FakeMessageStore {
    async fn list(&self, channel: &ChannelId, limit: i64) -> RepoResult<Vec<Message>> {
        let messages = self.messages.lock().unwrap();
        Ok(messages
            .iter()
            .rev()
            .filter(|m| &m.channel_id == channel)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        channel: &ChannelId,
        author_id: &str,
        content: &str,
    ) -> RepoResult<Message> {
        let mut messages = self.messages.lock().unwrap();
        let message = Message {
            id: messages.len() as i64 + 1,
            channel_id: channel.clone(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }
}
