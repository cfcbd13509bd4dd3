use serde::Serialize;

use crate::services::auth::error::AuthError;
use crate::services::auth::verifier::ClaimSet;

/// Principal reported on every deny, whoever the caller claimed to be.
pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";

const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Outcome handed to the access-control enforcement point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    principal_id: String,
    effect: Effect,
    resource: String,
}

/// Map a verification outcome to a decision. Never fails.
pub fn decide(result: &Result<ClaimSet, AuthError>, resource: &str) -> AuthorizationDecision {
    match result {
        Ok(claims) => AuthorizationDecision {
            principal_id: claims.subject().to_string(),
            effect: Effect::Allow,
            resource: resource.to_string(),
        },
        Err(_) => AuthorizationDecision {
            principal_id: ANONYMOUS_PRINCIPAL.to_string(),
            effect: Effect::Deny,
            resource: resource.to_string(),
        },
    }
}

impl AuthorizationDecision {
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn is_allow(&self) -> bool {
        self.effect == Effect::Allow
    }

    /// Render as a custom-authorizer policy response.
    pub fn policy(&self) -> PolicyResponse {
        PolicyResponse {
            principal_id: self.principal_id.clone(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION,
                statement: vec![Statement {
                    action: INVOKE_ACTION,
                    effect: self.effect,
                    resource: self.resource.clone(),
                }],
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: &'static str,
    pub effect: Effect,
    pub resource: String,
}
