use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::avatar;
use crate::config::{AvatarPolicy, ReconcilerConfig};
use crate::provider::{IdentityProvider, IdentityRecord, ProviderSignal};
use crate::session::{AuthSource, Session, SessionUser};
use crate::storage::CredentialStorage;
use crate::token;

/// The session reconciler.
///
/// Owns the single authoritative [`Session`] value. Each firing of the
/// identity provider's session-change stream is fed through [`apply`]
/// (or the [`run`] loop) and runs to completion before the next; the
/// provider wins over the local bearer token whenever it reports a session.
///
/// Construct one instance at application start and hand it (or a clone of
/// the `Arc` you wrap it in) to every consumer — there is no ambient global.
///
/// [`apply`]: SessionReconciler::apply
/// [`run`]: SessionReconciler::run
pub struct SessionReconciler<P, S> {
    provider: Arc<P>,
    storage: Arc<S>,
    config: ReconcilerConfig,
    current: RwLock<Session>,
}

impl<P, S> SessionReconciler<P, S>
where
    P: IdentityProvider,
    S: CredentialStorage,
{
    #[must_use]
    pub fn new(provider: P, storage: S, config: ReconcilerConfig) -> Self {
        let initial = Session {
            user: None,
            // Show the last known avatar while the first pass is in flight.
            avatar_url: storage
                .get(&config.avatar_key)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| config.fallback_avatar.clone()),
            ready: false,
        };
        Self {
            provider: Arc::new(provider),
            storage: Arc::new(storage),
            config,
            current: RwLock::new(initial),
        }
    }

    /// The current reconciled session (a snapshot).
    #[must_use]
    pub fn current(&self) -> Session {
        self.current.read().clone()
    }

    /// The durable storage backing this reconciler.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reconcile one firing of the provider's session-change stream and
    /// return the new session.
    ///
    /// Never fails: every upstream hiccup resolves to some valid session
    /// shape. After the first call `ready` is true and stays true.
    pub async fn apply(&self, signal: ProviderSignal) -> Session {
        let session = match signal {
            ProviderSignal::SignedIn(record) => self.reconcile_federated(record).await,
            ProviderSignal::SignedOut => self.reconcile_local(),
        };
        tracing::debug!(source = ?session.auth_source(), "session reconciled");
        self.install(session)
    }

    /// Drive the reconciler from a channel of provider signals until the
    /// sending side closes. Signals are processed strictly in order, one at
    /// a time.
    pub async fn run(&self, mut signals: mpsc::Receiver<ProviderSignal>) {
        while let Some(signal) = signals.recv().await {
            self.apply(signal).await;
        }
    }

    /// Sign out everywhere: provider-side when the session is federated
    /// (best-effort), then unconditional local reset.
    ///
    /// The bearer token is always removed; the cached avatar follows the
    /// configured [`AvatarPolicy`]. A provider-side failure is logged and
    /// does not block the local reset.
    pub async fn sign_out(&self) -> Session {
        let federated = self.current.read().auth_source() == AuthSource::Federated;
        if federated {
            if let Err(e) = self.provider.sign_out().await {
                tracing::warn!(error = %e, "provider sign-out failed, resetting local state anyway");
            }
        }

        self.storage.remove(&self.config.token_key);
        let avatar_url = match self.config.avatar_policy {
            AvatarPolicy::ClearOnSignOut => {
                self.storage.remove(&self.config.avatar_key);
                self.config.fallback_avatar.clone()
            }
            AvatarPolicy::KeepLastKnown => self.anonymous_avatar(),
        };

        self.install(Session {
            user: None,
            avatar_url,
            ready: true,
        })
    }

    /// Overwrite the session avatar and persist it, leaving the user and
    /// auth source untouched. Called after a successful profile-image
    /// upload.
    pub fn update_avatar(&self, url: &str) -> Session {
        self.storage.set(&self.config.avatar_key, url);
        let mut current = self.current.write();
        current.avatar_url = url.to_owned();
        current.clone()
    }

    /// The provider reports a session: refresh the record (best-effort),
    /// resolve and persist the avatar, go federated.
    async fn reconcile_federated(&self, record: IdentityRecord) -> Session {
        let timeout = self.config.refresh_timeout;
        let record = match tokio::time::timeout(timeout, self.provider.refresh(&record)).await {
            Ok(Ok(fresh)) => fresh,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "identity record refresh failed, keeping stale record");
                record
            }
            Err(_) => {
                tracing::warn!(?timeout, "identity record refresh timed out, keeping stale record");
                record
            }
        };

        let cached = self.storage.get(&self.config.avatar_key);
        let avatar_url =
            avatar::resolve_federated(&record, cached.as_deref(), &self.config.fallback_avatar);
        self.storage.set(&self.config.avatar_key, &avatar_url);

        Session {
            user: Some(SessionUser::Federated(record)),
            avatar_url,
            ready: true,
        }
    }

    /// No provider session: fall back to the stored bearer token, evicting
    /// it if it is malformed so it is not retried on every pass.
    fn reconcile_local(&self) -> Session {
        let Some(stored) = self.storage.get(&self.config.token_key) else {
            return self.anonymous();
        };

        match token::decode_claims(&stored) {
            Ok(claims) => {
                let avatar_url = avatar::resolve_local(&claims, &self.config.fallback_avatar);
                if claims.avatar().is_some() {
                    self.storage.set(&self.config.avatar_key, &avatar_url);
                }
                Session {
                    user: Some(SessionUser::Local(claims)),
                    avatar_url,
                    ready: true,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "evicting undecodable bearer token");
                self.storage.remove(&self.config.token_key);
                self.anonymous()
            }
        }
    }

    fn anonymous(&self) -> Session {
        Session {
            user: None,
            avatar_url: self.anonymous_avatar(),
            ready: true,
        }
    }

    /// Avatar to show while logged out, per policy.
    fn anonymous_avatar(&self) -> String {
        match self.config.avatar_policy {
            AvatarPolicy::KeepLastKnown => self
                .storage
                .get(&self.config.avatar_key)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.config.fallback_avatar.clone()),
            AvatarPolicy::ClearOnSignOut => self.config.fallback_avatar.clone(),
        }
    }

    fn install(&self, session: Session) -> Session {
        *self.current.write() = session.clone();
        session
    }
}
