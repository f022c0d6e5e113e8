use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::SubjectId;

/// A linked sub-profile the identity provider attaches to an account
/// (e.g. the Google profile behind a popup sign-in).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct LinkedAccount {
    pub provider_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl LinkedAccount {
    #[must_use]
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    #[must_use]
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }
}

/// Identity record pushed by the provider on session change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct IdentityRecord {
    pub uid: SubjectId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Provider-supplied sub-profiles, in provider order.
    #[serde(default)]
    pub linked_accounts: Vec<LinkedAccount>,
}

impl IdentityRecord {
    /// Create a record with only the required `uid`.
    #[must_use]
    pub fn new(uid: impl Into<SubjectId>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            photo_url: None,
            linked_accounts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_linked_account(mut self, account: LinkedAccount) -> Self {
        self.linked_accounts.push(account);
        self
    }

    /// Photo URL of the first linked sub-profile that has a non-empty one,
    /// the provider's own fallback position.
    #[must_use]
    pub fn linked_photo_url(&self) -> Option<&str> {
        self.linked_accounts
            .iter()
            .find_map(|account| account.photo_url.as_deref().filter(|s| !s.is_empty()))
    }
}

/// One firing of the identity provider's session-change stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderSignal {
    /// The provider holds a session for this identity.
    SignedIn(IdentityRecord),
    /// The provider explicitly reports no session.
    SignedOut,
}

/// Consumer-provided bridge to the identity provider SDK.
///
/// The provider owns the session-change stream; the integration subscribes
/// to it and forwards each firing to `SessionReconciler::apply` as a
/// [`ProviderSignal`]. This trait covers the two round-trips the reconciler
/// itself initiates.
///
/// # Example
///
/// ```rust,ignore
/// impl IdentityProvider for FirebaseBridge {
///     async fn refresh(&self, record: &IdentityRecord) -> Result<IdentityRecord, Error> {
///         self.sdk.reload(record.uid.as_str()).await.map_err(|e| Error::Provider(e.to_string()))
///     }
///
///     async fn sign_out(&self) -> Result<(), Error> {
///         self.sdk.sign_out().await.map_err(|e| Error::Provider(e.to_string()))
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Re-fetch the identity record so profile edits (avatar uploads in
    /// particular) show up without a full re-login. Best-effort: the
    /// reconciler keeps the stale record on failure.
    fn refresh(
        &self,
        record: &IdentityRecord,
    ) -> impl Future<Output = Result<IdentityRecord, Error>> + Send;

    /// Tear down the provider-side session.
    fn sign_out(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_photo_url_skips_accounts_without_one() {
        let record = IdentityRecord::new("u")
            .with_linked_account(LinkedAccount::new("password"))
            .with_linked_account(LinkedAccount::new("google.com").with_photo_url("g.png"));
        assert_eq!(record.linked_photo_url(), Some("g.png"));
    }

    #[test]
    fn linked_photo_url_none_when_absent() {
        let record = IdentityRecord::new("u");
        assert_eq!(record.linked_photo_url(), None);
    }

    #[test]
    fn record_deserializes_provider_field_names() {
        let record: IdentityRecord = serde_json::from_value(serde_json::json!({
            "uid": "u1",
            "photoURL": "p.png",
            "linked_accounts": [{ "provider_id": "google.com", "photoURL": "g.png" }],
        }))
        .unwrap();
        assert_eq!(record.photo_url.as_deref(), Some("p.png"));
        assert_eq!(record.linked_photo_url(), Some("g.png"));
    }
}
