/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /authorize は公開、/protected 配下に認可ゲートを適用
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{authorize::authorize, health::health, principal::show_principal};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/principal", get(show_principal));
    let protected = middleware::auth::access::apply(protected, state);

    Router::new()
        .route("/health", get(health))
        .route("/authorize", post(authorize))
        .nest("/protected", protected)
}
