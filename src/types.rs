use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Provider-assigned subject identifier (opaque string).
///
/// For a federated session this is the identity provider's `uid`; for a
/// local-token session it is the token's `sub` claim. Immutable, unique per
/// account. Consumers store this as the sole link to the user's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
