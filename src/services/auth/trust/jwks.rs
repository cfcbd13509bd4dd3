//! Out-of-band refresh of the trust anchor from a remote JWK set.
//!
//! Fetching never happens on the request path: the refresher runs at startup
//! and then on its own interval, swapping a fresh anchor into the
//! [`TrustStore`]. When every attempt fails the previous anchor stays in place.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use url::Url;

use crate::services::auth::error::AuthError;
use crate::services::auth::trust::{TrustAnchor, TrustStore};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch JWK set")]
    Request(#[from] reqwest::Error),
    #[error("received error response when fetching JWK set: {0}")]
    Status(StatusCode),
    #[error("JWK set holds no usable signing key")]
    NoUsableKeys,
}

/// Source of a JWK set.
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, FetchError>;
}

/// Fetches a JWK set over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpKeySetFetcher {
    client: Client,
    url: Url,
}

impl HttpKeySetFetcher {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self) -> Result<JwkSet, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.json::<JwkSet>().await?)
    }
}

pub struct JwksRefresher {
    fetcher: Arc<dyn KeySetFetcher>,
    store: TrustStore,
    // Statically configured keys kept alongside whatever the endpoint serves.
    pinned: TrustAnchor,
    retries: u32,
    backoff: Duration,
}

impl JwksRefresher {
    pub fn new(fetcher: Arc<dyn KeySetFetcher>, store: TrustStore) -> Self {
        Self {
            fetcher,
            store,
            pinned: TrustAnchor::empty(),
            retries: 2,
            backoff: Duration::from_millis(200),
        }
    }

    pub fn with_pinned(mut self, pinned: TrustAnchor) -> Self {
        self.pinned = pinned;
        self
    }

    /// Attempts after the first failed one.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Delay before the first retry; doubled on each further retry.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Fetch the key set and swap it in. Returns the number of keys installed.
    pub async fn refresh(&self) -> Result<usize, AuthError> {
        let mut delay = self.backoff;

        for attempt in 0..=self.retries {
            match self.fetch_anchor().await {
                Ok(anchor) => {
                    let keys = anchor.len();
                    self.store.replace(anchor);
                    info!(keys, "trust anchor refreshed");
                    return Ok(keys);
                }
                Err(e) => warn!(attempt = attempt + 1, error = %e, "JWK set fetch failed"),
            }

            if attempt < self.retries {
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
        }

        error!(
            retries = self.retries,
            keys = self.store.current().len(),
            "JWK set refresh exhausted, keeping current trust anchor"
        );
        Err(AuthError::TrustAnchorUnavailable)
    }

    async fn fetch_anchor(&self) -> Result<TrustAnchor, FetchError> {
        let set = self.fetcher.fetch().await?;
        let anchor = TrustAnchor::from_jwk_set(&set);
        if anchor.is_empty() {
            return Err(FetchError::NoUsableKeys);
        }
        Ok(anchor.merged_with(&self.pinned))
    }

    /// Refresh every `period` in the background. The first refresh is left
    /// to the caller, so the task waits one full period before starting.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                // Failures are logged inside; the stale anchor keeps serving.
                let _ = self.refresh().await;
            }
        })
    }
}
