/*
 * Responsibility
 * - POST /authorize: custom authorizer endpoint
 * - deny も 200 で policy document を返す (deny は transport error ではなく decision)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::dto::authorize::AuthorizeRequest, error::AppError,
    services::auth::PolicyResponse, state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    Json(req): Json<AuthorizeRequest>,
) -> Result<Json<PolicyResponse>, AppError> {
    req.validate()
        .map_err(|message| AppError::bad_request("UNSUPPORTED_EVENT", message))?;

    let decision = state.authorizer.authorize(
        req.authorization_token.as_deref(),
        req.method_arn.as_deref(),
    );

    Ok(Json(decision.policy()))
}
