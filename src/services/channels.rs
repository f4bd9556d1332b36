/*
 * Responsibility
 * - チャンネルの列挙と存在確認
 *   - "0" は常に存在する general チャンネル
 *   - それ以外は sport 1件につき 1チャンネル (sport の集合は外部所有)
 * - キャッシュしない (毎回外部に問い合わせる)
 */
use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;

use crate::repos::error::RepoResult;
use crate::services::auth::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub const GENERAL: &'static str = "0";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn general() -> Self {
        Self::new(Self::GENERAL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_general(&self) -> bool {
        self.0 == Self::GENERAL
    }

    /// Sport channels are keyed by the numeric sport id.
    ///
    /// Only the canonical decimal form names a channel: "07", "+7" and "00" are
    /// not sport 7 (or general), so they can never reach a store under a second key.
    pub fn sport_id(&self) -> Option<i64> {
        if self.is_general() {
            return None;
        }
        self.0
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0 && id.to_string() == self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ChannelId {
    fn from(sport_id: i64) -> Self {
        Self(sport_id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sport {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub general: bool,
}

/// Externally owned sport entity set.
#[async_trait]
pub trait SportCatalog: Send + Sync {
    async fn sport_exists(&self, sport_id: i64) -> RepoResult<bool>;
    async fn list_sports(&self) -> RepoResult<Vec<Sport>>;
}

#[derive(Clone)]
pub struct ChannelRegistry {
    sports: Arc<dyn SportCatalog>,
}

impl ChannelRegistry {
    pub const GENERAL_NAME: &'static str = "General";

    pub fn new(sports: Arc<dyn SportCatalog>) -> Self {
        Self { sports }
    }

    pub fn is_general(&self, channel: &ChannelId) -> bool {
        channel.is_general()
    }

    pub async fn exists(&self, channel: &ChannelId) -> Result<bool, AuthError> {
        if channel.is_general() {
            return Ok(true);
        }
        let Some(sport_id) = channel.sport_id() else {
            return Ok(false);
        };

        self.sports.sport_exists(sport_id).await.map_err(|err| {
            tracing::error!(error = %err, "sport lookup failed");
            AuthError::StoreUnavailable
        })
    }

    /// `exists`, but an unknown channel becomes `ChannelNotFound`.
    pub async fn ensure_exists(&self, channel: &ChannelId) -> Result<(), AuthError> {
        if self.exists(channel).await? {
            Ok(())
        } else {
            Err(AuthError::ChannelNotFound)
        }
    }

    /// General channel first, then one channel per sport.
    pub async fn list(&self) -> Result<Vec<Channel>, AuthError> {
        let sports = self.sports.list_sports().await.map_err(|err| {
            tracing::error!(error = %err, "sport listing failed");
            AuthError::StoreUnavailable
        })?;

        let mut channels = Vec::with_capacity(sports.len() + 1);
        channels.push(Channel {
            id: ChannelId::general(),
            name: Self::GENERAL_NAME.to_string(),
            general: true,
        });
        channels.extend(sports.into_iter().map(|s| Channel {
            id: ChannelId::from(s.id),
            name: s.name,
            general: false,
        }));

        Ok(channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakeSportCatalog;

    #[test]
    fn channel_id_parsing() {
        assert!(ChannelId::new("0").is_general());
        assert_eq!(ChannelId::new("0").sport_id(), None);
        assert_eq!(ChannelId::new("7").sport_id(), Some(7));
        assert_eq!(ChannelId::new("-3").sport_id(), None);
        assert_eq!(ChannelId::new("soccer").sport_id(), None);
        assert_eq!(ChannelId::new("07").sport_id(), None);
        assert_eq!(ChannelId::new("+7").sport_id(), None);
        assert_eq!(ChannelId::new("007").sport_id(), None);
        assert!(!ChannelId::new("00").is_general());
        assert_eq!(ChannelId::new("00").sport_id(), None);
        assert_eq!(ChannelId::from(12).as_str(), "12");
    }

    #[tokio::test]
    async fn general_exists_without_lookup() {
        let catalog = Arc::new(FakeSportCatalog::with_sports(&[(7, "Football")]));
        let registry = ChannelRegistry::new(catalog.clone());

        assert!(registry.exists(&ChannelId::general()).await.unwrap());
        assert_eq!(catalog.exists_calls(), 0);
    }

    #[tokio::test]
    async fn sport_channels_are_delegated() {
        let catalog = Arc::new(FakeSportCatalog::with_sports(&[(7, "Football")]));
        let registry = ChannelRegistry::new(catalog.clone());

        assert!(registry.exists(&ChannelId::new("7")).await.unwrap());
        assert!(!registry.exists(&ChannelId::new("8")).await.unwrap());
        assert_eq!(
            registry.ensure_exists(&ChannelId::new("8")).await,
            Err(AuthError::ChannelNotFound)
        );
        // Non-numeric ids never reach the catalog.
        assert!(!registry.exists(&ChannelId::new("abc")).await.unwrap());
        assert_eq!(catalog.exists_calls(), 3);
    }

    #[tokio::test]
    async fn non_canonical_ids_are_unknown_channels() {
        let catalog = Arc::new(FakeSportCatalog::with_sports(&[(7, "Football")]));
        let registry = ChannelRegistry::new(catalog.clone());

        for raw in ["07", "+7", "007", "00", " 7"] {
            assert_eq!(
                registry.ensure_exists(&ChannelId::new(raw)).await,
                Err(AuthError::ChannelNotFound),
                "{raw:?} must not alias a real channel"
            );
        }
        assert_eq!(catalog.exists_calls(), 0);
    }

    #[tokio::test]
    async fn lists_general_then_sports() {
        let catalog = Arc::new(FakeSportCatalog::with_sports(&[
            (3, "Tennis"),
            (7, "Football"),
        ]));
        let registry = ChannelRegistry::new(catalog);

        let channels = registry.list().await.unwrap();
        let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(ids, vec!["0", "3", "7"]);
        assert!(channels[0].general);
        assert_eq!(channels[2].name, "Football");
    }

    #[tokio::test]
    async fn catalog_failure_is_normalized() {
        let registry = ChannelRegistry::new(Arc::new(FakeSportCatalog::failing()));

        assert_eq!(
            registry.exists(&ChannelId::new("7")).await,
            Err(AuthError::StoreUnavailable)
        );
        assert_eq!(registry.list().await, Err(AuthError::StoreUnavailable));
    }
}
