pub mod authorizer;
pub mod credential;
pub mod decision;
pub mod error;
pub mod factory;
pub mod trust;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use authorizer::Authorizer;
pub use decision::{AuthorizationDecision, Effect, PolicyResponse};
pub use error::AuthError;
pub use factory::build_authorizer;
pub use verifier::{ClaimSet, TokenVerifier, VerifierPolicy};
