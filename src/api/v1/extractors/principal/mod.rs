/*!
 * Principal extractor
 *
 * Responsibility:
 * - 認可ゲートを通過したリクエストの principal を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - Principal
 * - PrincipalExtractor
 */

mod core;
mod types;

pub use self::core::PrincipalExtractor;
pub use types::Principal;
