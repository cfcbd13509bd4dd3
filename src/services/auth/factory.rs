/// Factory: build the authorizer (and its key refresher) from application `Config`.
use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::trust::{HttpKeySetFetcher, JwksRefresher, TrustAnchor, TrustStore};
use crate::services::auth::{Authorizer, TokenVerifier, VerifierPolicy};

pub struct AuthComponents {
    pub authorizer: Arc<Authorizer>,
    /// Present when a JWKS endpoint is configured; the caller runs it.
    pub refresher: Option<JwksRefresher>,
}

pub fn build_authorizer(config: &Config) -> Result<AuthComponents, AppError> {
    let pinned = match config.auth_public_key_pem.as_deref() {
        Some(pem) => {
            TrustAnchor::from_pem(config.auth_key_id.as_deref(), pem, config.auth_algorithm)
                .map_err(|e| {
                    warn!(
                        error = %e,
                        algorithm = ?config.auth_algorithm,
                        "failed to parse AUTH_PUBLIC_KEY_PEM"
                    );
                    AppError::Internal
                })?
        }
        None => TrustAnchor::empty(),
    };
    let trust = TrustStore::new(pinned.clone());

    let refresher = match &config.jwks {
        Some(jwks) => {
            let fetcher = HttpKeySetFetcher::new(jwks.url.clone(), jwks.fetch_timeout)
                .map_err(|e| {
                    warn!(error = %e, "failed to build JWKS client");
                    AppError::Internal
                })?;
            Some(
                JwksRefresher::new(Arc::new(fetcher), trust.clone())
                    .with_pinned(pinned)
                    .with_retries(jwks.fetch_retries),
            )
        }
        None => None,
    };

    let verifier = TokenVerifier::new(VerifierPolicy {
        algorithm: config.auth_algorithm,
        issuer: config.auth_issuer.clone(),
        audience: config.auth_audience.clone(),
        leeway_seconds: config.access_token_leeway_seconds,
    });

    Ok(AuthComponents {
        authorizer: Arc::new(Authorizer::new(verifier, trust, config.auth_resource.clone())),
        refresher,
    })
}
