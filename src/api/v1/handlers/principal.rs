use axum::Json;

use crate::api::v1::{dto::principal::PrincipalResponse, extractors::PrincipalExtractor};

/// GET /protected/principal: echoes who the gate let through.
pub async fn show_principal(
    PrincipalExtractor(principal): PrincipalExtractor,
) -> Json<PrincipalResponse> {
    Json(PrincipalResponse {
        principal_id: principal.principal_id,
    })
}
