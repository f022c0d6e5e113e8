//! Avatar resolution fallback chains.
//!
//! Every session shape resolves to some avatar URL; these chains encode the
//! priority order per credential source.

use crate::provider::IdentityRecord;
use crate::token::TokenClaims;

/// Resolve the avatar for a federated session.
///
/// Priority: provider photo, then cached avatar, then first linked-account
/// photo, then the fallback constant. The cached value outranks the
/// linked-account photo: a fresh upload must not be shadowed by an older
/// provider sub-profile. Empty strings count as absent at every link — the
/// resolved URL is never empty.
#[must_use]
pub fn resolve_federated(record: &IdentityRecord, cached: Option<&str>, fallback: &str) -> String {
    record
        .photo_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(cached.filter(|s| !s.is_empty()))
        .or_else(|| record.linked_photo_url())
        .unwrap_or(fallback)
        .to_owned()
}

/// Resolve the avatar for a local-token session: claim fields or fallback.
/// The cached avatar is not consulted; the token is the sole authority here.
#[must_use]
pub fn resolve_local(claims: &TokenClaims, fallback: &str) -> String {
    claims.avatar().unwrap_or(fallback).to_owned()
}
