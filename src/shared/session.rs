//! Session Identity
//!
//! The chat panel never reaches for ambient authentication state. Whoever
//! constructs it passes a [`Session`], which is either anonymous or carries
//! the signed-in [`UserIdentity`]. Tests build fixed identities directly.

use serde::{Deserialize, Serialize};

/// Fallback display name when no name field is usable
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Identity of a signed-in user as reported by the authentication provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserIdentity {
    /// Provider user id
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Primary email address
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserIdentity {
    /// Create an identity with only an id; name fields can be filled in after
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Display name: full name, then first name, then username, then "Anonymous"
    ///
    /// Empty or whitespace-only values are skipped.
    pub fn display_name(&self) -> String {
        [&self.full_name, &self.first_name, &self.username]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string())
    }
}

/// Signed-in state handed to the chat panel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    user: Option<UserIdentity>,
}

impl Session {
    pub fn signed_in(user: UserIdentity) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}
