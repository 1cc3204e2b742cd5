use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 失败响应：{ success: false, error: { type, message } }
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
