use std::time::Duration;

use crate::error::Error;
use crate::storage::keys;

/// Default avatar shown when no credential source supplies one.
pub const FALLBACK_AVATAR: &str = "https://ui-avatars.com/api/?name=VidTube+Viewer";

const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// What happens to the cached avatar on sign-out.
///
/// Observed client builds disagreed on this; the policy is an explicit
/// choice here, never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvatarPolicy {
    /// Remove the cached avatar and fall back to the default immediately.
    #[default]
    ClearOnSignOut,
    /// Keep the last known avatar on screen while logged out.
    KeepLastKnown,
}

/// Reconciler configuration.
///
/// All fields have working defaults. Override with `with_*` methods, or use
/// [`from_env()`](ReconcilerConfig::from_env) for convention-based setup.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub(crate) fallback_avatar: String,
    pub(crate) avatar_policy: AvatarPolicy,
    pub(crate) refresh_timeout: Duration,
    pub(crate) token_key: String,
    pub(crate) avatar_key: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            fallback_avatar: FALLBACK_AVATAR.into(),
            avatar_policy: AvatarPolicy::default(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            token_key: keys::BEARER_TOKEN.into(),
            avatar_key: keys::PROFILE_IMAGE.into(),
        }
    }
}

impl ReconcilerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `VIDTUBE_FALLBACK_AVATAR`: default avatar URL
    /// - `VIDTUBE_AVATAR_POLICY`: `clear` (default) or `keep`
    /// - `VIDTUBE_REFRESH_TIMEOUT_SECS`: identity refresh timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a set variable has an invalid value.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("VIDTUBE_FALLBACK_AVATAR") {
            if url.is_empty() {
                return Err(Error::Config("VIDTUBE_FALLBACK_AVATAR must not be empty".into()));
            }
            config.fallback_avatar = url;
        }
        if let Ok(policy) = std::env::var("VIDTUBE_AVATAR_POLICY") {
            config.avatar_policy = match policy.as_str() {
                "clear" => AvatarPolicy::ClearOnSignOut,
                "keep" => AvatarPolicy::KeepLastKnown,
                other => {
                    return Err(Error::Config(format!(
                        "VIDTUBE_AVATAR_POLICY must be 'clear' or 'keep', got '{other}'"
                    )));
                }
            };
        }
        if let Ok(secs) = std::env::var("VIDTUBE_REFRESH_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("VIDTUBE_REFRESH_TIMEOUT_SECS: {e}")))?;
            config.refresh_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the fallback avatar URL. An empty string is ignored and the
    /// built-in default kept — the fallback is the last link of every avatar
    /// chain and must never be empty.
    #[must_use]
    pub fn with_fallback_avatar(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if url.is_empty() {
            return self;
        }
        self.fallback_avatar = url;
        self
    }

    #[must_use]
    pub fn with_avatar_policy(mut self, policy: AvatarPolicy) -> Self {
        self.avatar_policy = policy;
        self
    }

    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Override the storage key for the bearer token.
    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Override the storage key for the cached avatar.
    #[must_use]
    pub fn with_avatar_key(mut self, key: impl Into<String>) -> Self {
        self.avatar_key = key.into();
        self
    }

    #[must_use]
    pub fn fallback_avatar(&self) -> &str {
        &self.fallback_avatar
    }

    #[must_use]
    pub fn avatar_policy(&self) -> AvatarPolicy {
        self.avatar_policy
    }

    #[must_use]
    pub fn refresh_timeout(&self) -> Duration {
        self.refresh_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.fallback_avatar(), FALLBACK_AVATAR);
        assert_eq!(config.avatar_policy(), AvatarPolicy::ClearOnSignOut);
        assert_eq!(config.refresh_timeout(), DEFAULT_REFRESH_TIMEOUT);
        assert_eq!(config.token_key, keys::BEARER_TOKEN);
        assert_eq!(config.avatar_key, keys::PROFILE_IMAGE);
    }

    #[test]
    fn empty_fallback_avatar_keeps_default() {
        let config = ReconcilerConfig::new().with_fallback_avatar("");
        assert_eq!(config.fallback_avatar(), FALLBACK_AVATAR);
    }

    #[test]
    fn builder_overrides() {
        let config = ReconcilerConfig::new()
            .with_fallback_avatar("https://cdn.example.com/default.png")
            .with_avatar_policy(AvatarPolicy::KeepLastKnown)
            .with_refresh_timeout(Duration::from_secs(3))
            .with_token_key("authToken")
            .with_avatar_key("avatar");

        assert_eq!(config.fallback_avatar(), "https://cdn.example.com/default.png");
        assert_eq!(config.avatar_policy(), AvatarPolicy::KeepLastKnown);
        assert_eq!(config.refresh_timeout(), Duration::from_secs(3));
        assert_eq!(config.token_key, "authToken");
        assert_eq!(config.avatar_key, "avatar");
    }
}
