//! Signed-token verification.
//!
//! A token goes through a single pass of hard gates, each one aborting the
//! pass on failure:
//!
//! 1. structural decode of `header.payload.signature`
//! 2. algorithm pinning against the configured algorithm
//! 3. key selection from the trust anchor (by `kid`)
//! 4. signature verification over the exact `header.payload` bytes
//! 5. claim validation (`exp`, `nbf`, `iss`, `aud`)
//!
//! Claims are only decoded once the signature has verified.

use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::services::auth::error::AuthError;
use crate::services::auth::trust::TrustAnchor;

/// Deployment-fixed verification settings.
#[derive(Debug, Clone)]
pub struct VerifierPolicy {
    /// The only algorithm tokens may declare.
    pub algorithm: Algorithm,
    pub issuer: String,
    /// When set, the token `aud` must contain it.
    pub audience: Option<String>,
    /// Allowed clock skew for `exp`/`nbf`, seconds.
    pub leeway_seconds: u64,
}

/// Claims of a token whose signature has verified.
///
/// Only [`TokenVerifier`] can build one.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    subject: String,
    issuer: String,
    expires_at: i64,
    audience: Vec<String>,
    not_before: Option<i64>,
    issued_at: Option<i64>,
    custom: Map<String, Value>,
}

impl ClaimSet {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn not_before(&self) -> Option<i64> {
        self.not_before
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.issued_at
    }

    /// Any claim outside the registered ones handled above.
    pub fn custom(&self, name: &str) -> Option<&Value> {
        self.custom.get(name)
    }
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAudience {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    iss: String,
    exp: i64,
    #[serde(default)]
    aud: Option<RawAudience>,
    #[serde(default)]
    nbf: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(flatten)]
    custom: Map<String, Value>,
}

struct DecodedToken {
    header: RawHeader,
    payload: Vec<u8>,
}

/// Verifies tokens against a trust anchor under a fixed [`VerifierPolicy`].
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    policy: VerifierPolicy,
    // Signature-only validation: claims are checked here, in our own order.
    signature_validation: Validation,
}

impl TokenVerifier {
    pub fn new(policy: VerifierPolicy) -> Self {
        let mut signature_validation = Validation::new(policy.algorithm);
        signature_validation.validate_exp = false;
        signature_validation.validate_nbf = false;
        signature_validation.validate_aud = false;
        signature_validation.required_spec_claims.clear();

        Self {
            policy,
            signature_validation,
        }
    }

    pub fn policy(&self) -> &VerifierPolicy {
        &self.policy
    }

    pub fn verify(&self, token: &str, anchor: &TrustAnchor) -> Result<ClaimSet, AuthError> {
        self.verify_at(token, anchor, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify`](Self::verify) with an explicit clock (seconds since epoch).
    pub fn verify_at(
        &self,
        token: &str,
        anchor: &TrustAnchor,
        now: i64,
    ) -> Result<ClaimSet, AuthError> {
        let decoded = decode_structure(token)?;

        // The declared algorithm is only compared, never used to pick the primitive.
        match Algorithm::from_str(&decoded.header.alg) {
            Ok(alg) if alg == self.policy.algorithm => {}
            _ => return Err(AuthError::UnsupportedAlgorithm),
        }

        let key = anchor.select(decoded.header.kid.as_deref())?;

        jsonwebtoken::decode::<Value>(token, key, &self.signature_validation).map_err(|e| {
            match e.kind() {
                ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                    AuthError::MalformedToken
                }
                _ => AuthError::InvalidSignature,
            }
        })?;

        let claims: RawClaims =
            serde_json::from_slice(&decoded.payload).map_err(|_| AuthError::MalformedToken)?;
        self.validate_claims(claims, now)
    }

    fn validate_claims(&self, claims: RawClaims, now: i64) -> Result<ClaimSet, AuthError> {
        let leeway = i64::try_from(self.policy.leeway_seconds).unwrap_or(i64::MAX);

        if claims.exp.saturating_add(leeway) <= now {
            return Err(AuthError::TokenExpired);
        }
        if let Some(nbf) = claims.nbf
            && nbf > now.saturating_add(leeway)
        {
            return Err(AuthError::TokenNotYetValid);
        }
        if claims.iss != self.policy.issuer {
            return Err(AuthError::IssuerMismatch);
        }

        let audience = match claims.aud {
            Some(RawAudience::One(aud)) => vec![aud],
            Some(RawAudience::Many(aud)) => aud,
            None => Vec::new(),
        };
        if let Some(expected) = self.policy.audience.as_deref()
            && !audience.iter().any(|aud| aud == expected)
        {
            return Err(AuthError::AudienceMismatch);
        }

        Ok(ClaimSet {
            subject: claims.sub,
            issuer: claims.iss,
            expires_at: claims.exp,
            audience,
            not_before: claims.nbf,
            issued_at: claims.iat,
            custom: claims.custom,
        })
    }
}

fn decode_structure(token: &str) -> Result<DecodedToken, AuthError> {
    let mut segments = token.split('.');
    let (header, payload, signature) = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() => (h, p, s),
        _ => return Err(AuthError::MalformedToken),
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::MalformedToken)?;
    let header: RawHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)?;
    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;
    URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::MalformedToken)?;

    Ok(DecodedToken { header, payload })
}
