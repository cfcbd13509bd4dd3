use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use jsonwebtoken::jwk::{JwkSet, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use tracing::warn;

use crate::services::auth::error::AuthError;

/// Public key material trusted to sign tokens, indexed by key id.
///
/// A statically configured key may carry no key id at all; it then answers
/// for any token as long as it is the only key in the anchor.
#[derive(Clone, Default)]
pub struct TrustAnchor {
    keys: HashMap<String, DecodingKey>,
    unnamed: Option<DecodingKey>,
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        let mut kids: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        kids.sort_unstable();
        f.debug_struct("TrustAnchor")
            .field("kids", &kids)
            .field("unnamed", &self.unnamed.is_some())
            .finish()
    }
}

impl TrustAnchor {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single-key anchor from a PEM public key of the family `algorithm` uses.
    pub fn from_pem(
        kid: Option<&str>,
        pem: &str,
        algorithm: Algorithm,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = match algorithm {
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes())?,
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes())?,
            _ => DecodingKey::from_rsa_pem(pem.as_bytes())?,
        };

        let mut anchor = Self::default();
        match kid {
            Some(kid) => {
                anchor.keys.insert(kid.to_string(), key);
            }
            None => anchor.unnamed = Some(key),
        }
        Ok(anchor)
    }

    /// Anchor holding every usable signing key of a JWK set.
    ///
    /// Keys without `kid`, encryption keys and keys whose parameters cannot be
    /// turned into a decoding key are skipped.
    pub fn from_jwk_set(set: &JwkSet) -> Self {
        let mut anchor = Self::default();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                warn!("skipping JWK without kid");
                continue;
            };
            if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
                continue;
            }
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    anchor.keys.insert(kid.to_string(), key);
                }
                Err(e) => warn!(kid = %kid, error = %e, "skipping unusable JWK"),
            }
        }
        anchor
    }

    /// Seed `self` with the keys of `other`; keys already present win.
    pub fn merged_with(mut self, other: &TrustAnchor) -> Self {
        for (kid, key) in &other.keys {
            self.keys
                .entry(kid.clone())
                .or_insert_with(|| key.clone());
        }
        if self.unnamed.is_none() {
            self.unnamed = other.unnamed.clone();
        }
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len() + usize::from(self.unnamed.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    /// Pick the key a token with header `kid` must verify against.
    pub fn select(&self, kid: Option<&str>) -> Result<&DecodingKey, AuthError> {
        if self.is_empty() {
            return Err(AuthError::TrustAnchorUnavailable);
        }

        if let Some(key) = kid.and_then(|kid| self.keys.get(kid)) {
            return Ok(key);
        }

        // Without a matching kid only an anchor of exactly one key can answer.
        if self.len() != 1 {
            return Err(AuthError::UnknownKeyId);
        }
        match (kid, &self.unnamed) {
            (_, Some(key)) => Ok(key),
            (None, None) => self.keys.values().next().ok_or(AuthError::UnknownKeyId),
            (Some(_), None) => Err(AuthError::UnknownKeyId),
        }
    }
}

/// Process-wide holder of the current [`TrustAnchor`].
///
/// Readers take a snapshot per verification; rotation replaces the whole
/// anchor at once, so a reader never observes a half-built key set.
#[derive(Clone, Debug)]
pub struct TrustStore {
    current: Arc<ArcSwap<TrustAnchor>>,
}

impl TrustStore {
    pub fn new(anchor: TrustAnchor) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(anchor)),
        }
    }

    pub fn current(&self) -> Arc<TrustAnchor> {
        self.current.load_full()
    }

    pub fn replace(&self, anchor: TrustAnchor) {
        self.current.store(Arc::new(anchor));
    }
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::new(TrustAnchor::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::test_support::{JWKS, ROGUE_PUBLIC_PEM, TRUSTED_PUBLIC_PEM};

    fn jwk_set(json: &str) -> JwkSet {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_anchor_is_unavailable() {
        let anchor = TrustAnchor::empty();
        assert_eq!(
            anchor.select(Some("any")).err(),
            Some(AuthError::TrustAnchorUnavailable)
        );
        assert_eq!(
            anchor.select(None).err(),
            Some(AuthError::TrustAnchorUnavailable)
        );
    }

    #[test]
    fn unnamed_static_key_answers_any_kid() {
        let anchor = TrustAnchor::from_pem(None, TRUSTED_PUBLIC_PEM, Algorithm::RS256).unwrap();
        assert_eq!(anchor.len(), 1);
        assert!(anchor.select(None).is_ok());
        assert!(anchor.select(Some("whatever")).is_ok());
    }

    #[test]
    fn named_static_key_requires_matching_kid() {
        let anchor =
            TrustAnchor::from_pem(Some("static"), TRUSTED_PUBLIC_PEM, Algorithm::RS256).unwrap();
        assert!(anchor.select(Some("static")).is_ok());
        assert!(anchor.select(None).is_ok());
        assert_eq!(
            anchor.select(Some("other")).err(),
            Some(AuthError::UnknownKeyId)
        );
    }

    #[test]
    fn several_keys_need_a_kid() {
        let anchor = TrustAnchor::from_jwk_set(&jwk_set(JWKS)).merged_with(
            &TrustAnchor::from_pem(Some("rogue"), ROGUE_PUBLIC_PEM, Algorithm::RS256).unwrap(),
        );
        assert_eq!(anchor.len(), 2);
        assert!(anchor.select(Some("trusted-2024")).is_ok());
        assert!(anchor.select(Some("rogue")).is_ok());
        assert_eq!(anchor.select(None).err(), Some(AuthError::UnknownKeyId));
    }

    #[test]
    fn jwk_set_skips_keys_without_kid_and_encryption_keys() {
        let mut set = jwk_set(JWKS);
        let mut no_kid = set.keys[0].clone();
        no_kid.common.key_id = None;
        let mut enc = set.keys[0].clone();
        enc.common.key_id = Some("enc".to_string());
        enc.common.public_key_use = Some(PublicKeyUse::Encryption);
        set.keys.push(no_kid);
        set.keys.push(enc);

        let anchor = TrustAnchor::from_jwk_set(&set);
        assert_eq!(anchor.len(), 1);
        assert!(anchor.contains("trusted-2024"));
        assert!(!anchor.contains("enc"));
    }

    #[test]
    fn invalid_pem_is_rejected() {
        assert!(TrustAnchor::from_pem(None, "not a pem", Algorithm::RS256).is_err());
    }

    #[test]
    fn replace_swaps_the_whole_anchor() {
        let store = TrustStore::new(TrustAnchor::from_jwk_set(&jwk_set(JWKS)));
        let before = store.current();

        store.replace(TrustAnchor::empty());

        // Snapshots taken earlier stay intact.
        assert!(before.contains("trusted-2024"));
        assert!(store.current().is_empty());
    }

    #[test]
    fn debug_does_not_print_keys() {
        let anchor = TrustAnchor::from_jwk_set(&jwk_set(JWKS));
        let out = format!("{anchor:?}");
        assert!(out.contains("trusted-2024"));
        assert!(!out.contains("BEGIN"));
    }
}
