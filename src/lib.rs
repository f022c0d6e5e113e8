#![doc = include_str!("../README.md")]

pub mod avatar;
pub mod backend;
pub mod config;
pub mod error;
pub mod provider;
pub mod reconciler;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use backend::{BackendClient, UploadedImage};
pub use config::{AvatarPolicy, FALLBACK_AVATAR, ReconcilerConfig};
pub use error::Error;
pub use provider::{IdentityProvider, IdentityRecord, LinkedAccount, ProviderSignal};
pub use reconciler::SessionReconciler;
pub use session::{AuthSource, Session, SessionUser};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage};
pub use token::{TokenClaims, decode_claims, is_well_formed};
pub use types::SubjectId;
