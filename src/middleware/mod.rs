/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: 認可ゲート (enforcement point)
 * - http: request id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
