/*
 * Responsibility
 * - POST /authorize の request DTO (custom authorizer の TOKEN event)
 * - response は services::auth::PolicyResponse をそのまま返す
 */
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub method_arn: Option<String>,
}

impl AuthorizeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(event_type) = &self.event_type
            && !event_type.eq_ignore_ascii_case("TOKEN")
        {
            return Err("only TOKEN authorizer events are supported");
        }
        Ok(())
    }
}
