//! Request-time authorization gate: extract → verify → decide.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::services::auth::credential;
use crate::services::auth::decision::{AuthorizationDecision, decide};
use crate::services::auth::error::AuthError;
use crate::services::auth::trust::TrustStore;
use crate::services::auth::verifier::{ClaimSet, TokenVerifier};

pub struct Authorizer {
    verifier: TokenVerifier,
    trust: TrustStore,
    default_resource: String,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("policy", self.verifier.policy())
            .field("trust", &self.trust.current())
            .field("default_resource", &self.default_resource)
            .finish()
    }
}

impl Authorizer {
    pub fn new(
        verifier: TokenVerifier,
        trust: TrustStore,
        default_resource: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            trust,
            default_resource: default_resource.into(),
        }
    }

    pub fn trust(&self) -> &TrustStore {
        &self.trust
    }

    /// Decide on a raw `Authorization` header value.
    ///
    /// `resource` falls back to the configured default. Failure details are
    /// logged here and never reach the decision.
    pub fn authorize(&self, header: Option<&str>, resource: Option<&str>) -> AuthorizationDecision {
        let resource = resource.unwrap_or(&self.default_resource);
        let result = self.check(header);
        if let Ok(claims) = &result {
            info!(principal = %claims.subject(), resource, "caller authorized");
        }
        decide(&result, resource)
    }

    /// Verified claims for a raw `Authorization` header value.
    pub fn check(&self, header: Option<&str>) -> Result<ClaimSet, AuthError> {
        let token = credential::extract(header).inspect_err(|e| {
            warn!(reason = e.code(), "bearer credential rejected");
        })?;

        // Snapshot: a concurrent rotation cannot change keys mid-verification.
        let anchor = self.trust.current();
        self.verifier.verify(token, &anchor).inspect_err(|e| {
            warn!(
                reason = e.code(),
                token = %fingerprint(token),
                "token verification failed"
            );
        })
    }
}

/// base64url(SHA-256(token)), safe to log in place of the token.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
