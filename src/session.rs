use serde::{Deserialize, Serialize};

use crate::provider::IdentityRecord;
use crate::token::TokenClaims;
use crate::types::SubjectId;

/// Which credential source is backing the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthSource {
    None,
    Federated,
    LocalToken,
}

/// The authenticated identity, tagged by its credential source.
///
/// Federated sessions carry the provider's identity record; local-token
/// sessions carry the decoded token claims. The two use different avatar
/// field names — [`SessionUser::photo_url`] is the one accessor that knows
/// the mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "credential", rename_all = "kebab-case")]
pub enum SessionUser {
    Federated(IdentityRecord),
    Local(TokenClaims),
}

impl SessionUser {
    #[must_use]
    pub fn auth_source(&self) -> AuthSource {
        match self {
            Self::Federated(_) => AuthSource::Federated,
            Self::Local(_) => AuthSource::LocalToken,
        }
    }

    /// Subject identifier, when the credential carries one.
    #[must_use]
    pub fn subject(&self) -> Option<&SubjectId> {
        match self {
            Self::Federated(record) => Some(&record.uid),
            Self::Local(claims) => claims.sub.as_ref(),
        }
    }

    /// Avatar URL straight from the credential, before any fallback.
    #[must_use]
    pub fn photo_url(&self) -> Option<&str> {
        match self {
            Self::Federated(record) => record.photo_url.as_deref(),
            Self::Local(claims) => claims.avatar(),
        }
    }

    /// Display name for user-facing chrome (navbar, comment authorship).
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Federated(record) => record.display_name.as_deref(),
            Self::Local(claims) => claims.name.as_deref(),
        }
    }
}

/// The reconciled session view the rest of the application reads.
///
/// Replaced wholesale on every reconciliation pass; treat a held value as a
/// snapshot and re-read via `SessionReconciler::current` when it matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<SessionUser>,
    /// Always non-empty once `ready` — resolves to the fallback constant at worst.
    pub avatar_url: String,
    /// False only until the first reconciliation pass completes; never reverts.
    pub ready: bool,
}

impl Session {
    #[must_use]
    pub fn auth_source(&self) -> AuthSource {
        self.user
            .as_ref()
            .map_or(AuthSource::None, SessionUser::auth_source)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Route-guard check: true when reconciliation has settled and nobody is
    /// signed in.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        self.ready && self.user.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IdentityRecord {
        IdentityRecord::new(SubjectId::from("uid-1"))
            .with_display_name("Viewer")
            .with_photo_url("https://cdn.example.com/p.png")
    }

    #[test]
    fn auth_source_follows_user_variant() {
        let anonymous = Session {
            user: None,
            avatar_url: "x".into(),
            ready: true,
        };
        assert_eq!(anonymous.auth_source(), AuthSource::None);

        let federated = Session {
            user: Some(SessionUser::Federated(record())),
            avatar_url: "x".into(),
            ready: true,
        };
        assert_eq!(federated.auth_source(), AuthSource::Federated);
        assert!(federated.is_authenticated());
    }

    #[test]
    fn requires_login_only_when_ready() {
        let initializing = Session {
            user: None,
            avatar_url: "x".into(),
            ready: false,
        };
        assert!(!initializing.requires_login());

        let anonymous = Session {
            ready: true,
            ..initializing
        };
        assert!(anonymous.requires_login());
    }

    #[test]
    fn photo_url_maps_per_variant() {
        let federated = SessionUser::Federated(record());
        assert_eq!(federated.photo_url(), Some("https://cdn.example.com/p.png"));
        assert_eq!(federated.subject().map(SubjectId::as_str), Some("uid-1"));

        let claims: crate::token::TokenClaims =
            serde_json::from_value(serde_json::json!({ "sub": "u2", "avatarUrl": "local.png" }))
                .unwrap();
        let local = SessionUser::Local(claims);
        assert_eq!(local.photo_url(), Some("local.png"));
        assert_eq!(local.auth_source(), AuthSource::LocalToken);
    }
}
