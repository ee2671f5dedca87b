//! Account credentials and identity.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// OAuth2 credential pair for one platform account.
///
/// `Debug` output redacts both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Credentials {
    access_token: String,
    refresh_token: Option<String>,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// The authenticated account as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct UserProfile {
    id: String,
    handle: String,
    name: Option<String>,
}

impl UserProfile {
    /// Create a profile.
    pub fn new(id: impl Into<String>, handle: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_tokens() {
        let creds = Credentials::new("secret-access", Some("secret-refresh".into()));
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("redacted"));
    }
}
