mod anchor;
pub mod jwks;

pub use anchor::{TrustAnchor, TrustStore};
pub use jwks::{HttpKeySetFetcher, JwksRefresher, KeySetFetcher};
