use thiserror::Error;

/// Why a bearer credential was refused.
///
/// Every variant is an authorization failure, not a system fault: the
/// authorizer turns each of them into a deny decision. The variant is only
/// ever logged, never returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header is missing or empty")]
    MissingCredential,
    #[error("authorization header is not a bearer credential")]
    MalformedCredential,
    #[error("token is not a well-formed signed token")]
    MalformedToken,
    #[error("token declares an algorithm other than the pinned one")]
    UnsupportedAlgorithm,
    #[error("token key id does not match any trusted key")]
    UnknownKeyId,
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token has expired")]
    TokenExpired,
    #[error("token is not valid yet")]
    TokenNotYetValid,
    #[error("token issuer does not match")]
    IssuerMismatch,
    #[error("token audience does not match")]
    AudienceMismatch,
    #[error("no trusted key material is available")]
    TrustAnchorUnavailable,
}

impl AuthError {
    /// Stable label for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedCredential => "malformed_credential",
            Self::MalformedToken => "malformed_token",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::UnknownKeyId => "unknown_key_id",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::TokenNotYetValid => "token_not_yet_valid",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::AudienceMismatch => "audience_mismatch",
            Self::TrustAnchorUnavailable => "trust_anchor_unavailable",
        }
    }
}
