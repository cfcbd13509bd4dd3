/*
 * Responsibility
 * - Handler から見える「認可済み主体」の型
 * - middleware が authorizer の allow decision から作り request extensions に格納する
 *
 * Notes
 * - claim set そのものは handler に渡さない (decision の principal のみ)
 */

/// 認可済みのリクエストに付与される主体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: String,
}

impl Principal {
    pub fn new(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
        }
    }
}
