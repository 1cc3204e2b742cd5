use serde::Serialize;

/// 当前请求的身份，由认证中间件写入 request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub is_admin: bool,
}
