use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::types::SubjectId;

/// Claims decoded from the locally persisted bearer token.
///
/// The backend issues 3-segment signed tokens. Only the payload segment is
/// decoded here; signature verification is the backend's job on every API
/// call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<SubjectId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default, rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl TokenClaims {
    /// Gets a non-standard claim value by key.
    #[must_use]
    pub fn get_claim(&self, key: &str) -> Option<&JsonValue> {
        self.extra.get(key)
    }

    /// Avatar URL from the claims, whichever field the backend used.
    /// An empty string counts as absent.
    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.photo_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.avatar_url.as_deref().filter(|s| !s.is_empty()))
    }

    /// Whether the token's `exp` claim is in the past.
    ///
    /// Informational only — reconciliation does not enforce expiry, the
    /// backend rejects expired tokens itself.
    #[must_use]
    pub fn is_expired(&self, now: time::OffsetDateTime) -> bool {
        match self.exp {
            Some(exp) => exp <= now.unix_timestamp(),
            None => false,
        }
    }
}

/// Checks the structural shape of a stored bearer token without decoding it.
///
/// A well-formed token is exactly 3 non-empty dot-separated segments. The
/// empty string and the literal `"null"` (artifacts of a buggy writer) are
/// rejected too.
#[must_use]
pub fn is_well_formed(token_str: &str) -> bool {
    if token_str.is_empty() || token_str == "null" {
        return false;
    }
    let mut segments = 0;
    for part in token_str.split('.') {
        if part.is_empty() {
            return false;
        }
        segments += 1;
    }
    segments == 3
}

/// Decodes the claims segment of a 3-part bearer token.
///
/// # Errors
///
/// Returns [`Error::Token`] if the token is not exactly 3 dot-separated
/// segments, the payload is not valid base64url, or the payload is not a
/// JSON claims object.
pub fn decode_claims(token_str: &str) -> Result<TokenClaims, Error> {
    if !is_well_formed(token_str) {
        return Err(Error::Token("invalid token format".into()));
    }

    // is_well_formed guarantees exactly 3 non-empty segments
    let Some(payload_b64) = token_str.split('.').nth(1) else {
        return Err(Error::Token("invalid token format".into()));
    };

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| Error::Token("invalid payload encoding".into()))?;

    serde_json::from_slice(&payload).map_err(|e| Error::Token(format!("invalid claims: {e}")))
}

/// Builds an unsigned 3-segment token around the given claims JSON.
#[cfg(test)]
pub(crate) fn encode_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_single_segment() {
        assert!(decode_claims("abc").is_err());
    }

    #[test]
    fn rejects_two_and_four_segments() {
        assert!(decode_claims("a.b").is_err());
        assert!(decode_claims("a.b.c.d").is_err());
    }

    #[test]
    fn rejects_empty_and_null_literal() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("null"));
        assert!(decode_claims("").is_err());
        assert!(decode_claims("null").is_err());
    }

    #[test]
    fn rejects_empty_segment() {
        assert!(!is_well_formed("a..c"));
        assert!(decode_claims("a..c").is_err());
    }

    #[test]
    fn rejects_bad_payload_encoding() {
        // 3 segments but the middle one is not base64url
        assert!(decode_claims("aGVhZGVy.!!!.c2ln").is_err());
    }

    #[test]
    fn rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(decode_claims(&format!("h.{payload}.s")).is_err());
    }

    #[test]
    fn decodes_claims() {
        let token = encode_token(&serde_json::json!({
            "sub": "user-1",
            "email": "viewer@example.com",
            "photoURL": "https://cdn.example.com/a.png",
            "exp": 4102444800i64,
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, Some(SubjectId::from("user-1")));
        assert_eq!(claims.email.as_deref(), Some("viewer@example.com"));
        assert_eq!(claims.avatar(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn avatar_prefers_photo_url_over_avatar_url() {
        let token = encode_token(&serde_json::json!({
            "photoURL": "first",
            "avatarUrl": "second",
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.avatar(), Some("first"));
    }

    #[test]
    fn avatar_treats_empty_fields_as_absent() {
        let both_empty = decode_claims(&encode_token(&serde_json::json!({
            "photoURL": "",
            "avatarUrl": "",
        })))
        .unwrap();
        assert_eq!(both_empty.avatar(), None);

        let empty_then_set = decode_claims(&encode_token(&serde_json::json!({
            "photoURL": "",
            "avatarUrl": "real.png",
        })))
        .unwrap();
        assert_eq!(empty_then_set.avatar(), Some("real.png"));
    }

    #[test]
    fn avatar_falls_back_to_avatar_url() {
        let token = encode_token(&serde_json::json!({ "avatarUrl": "only" }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.avatar(), Some("only"));
    }

    #[test]
    fn unknown_claims_land_in_extra() {
        let token = encode_token(&serde_json::json!({ "sub": "u", "role": "admin" }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(
            claims.get_claim("role").and_then(|v| v.as_str()),
            Some("admin")
        );
    }

    #[test]
    fn expiry_helper() {
        let now = time::OffsetDateTime::from_unix_timestamp(1_000_000).unwrap();
        let expired = decode_claims(&encode_token(&serde_json::json!({ "exp": 999_999 }))).unwrap();
        let live = decode_claims(&encode_token(&serde_json::json!({ "exp": 1_000_001 }))).unwrap();
        let no_exp = decode_claims(&encode_token(&serde_json::json!({}))).unwrap();
        assert!(expired.is_expired(now));
        assert!(!live.is_expired(now));
        assert!(!no_exp.is_expired(now));
    }
}
