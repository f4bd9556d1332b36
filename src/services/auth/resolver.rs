//! Verified identity → local user record.
use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;

use crate::repos::error::RepoResult;
use crate::services::auth::error::AuthError;
use crate::services::auth::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Anything other than `admin` is read as a plain user.
    pub fn from_db(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Local account, owned by the User Directory. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> RepoResult<Option<User>>;
}

#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn UserDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Fail closed: a valid token for a subject with no local account grants nothing.
    /// Users are never created here.
    pub async fn resolve(&self, identity: &Identity) -> Result<User, AuthError> {
        let user = self
            .directory
            .find_user_by_id(&identity.subject_id)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "user directory lookup failed");
                AuthError::StoreUnavailable
            })?;

        user.ok_or_else(|| {
            tracing::info!("verified identity has no local account");
            AuthError::UserNotFound
        })
    }
}
