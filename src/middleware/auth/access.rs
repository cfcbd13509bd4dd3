//! Bearer gate as an enforcement point: authorize → `Principal` を extensions に入れる
//!
//! - `Authorization` ヘッダを authorizer に渡し、allow/deny を決める
//! - deny は理由を問わず 401 (理由はログのみ)
//! - allow の場合、principal を request extensions に格納し handler へ渡す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// 保護したい router に認可ゲートを掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/principal", get(show));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let decision = {
        let header = match req.headers().get(header::AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                tracing::warn!("authorization header is not visible ASCII");
                AppError::Unauthorized
            })?),
            None => None,
        };
        state
            .authorizer
            .authorize(header, Some(req.uri().path()))
    };

    if !decision.is_allow() {
        return Err(AppError::Unauthorized);
    }

    // middleware → extractor への受け渡し
    req.extensions_mut()
        .insert(Principal::new(decision.principal_id()));

    Ok(next.run(req).await)
}
