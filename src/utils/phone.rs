use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

static ID_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+628\d{7,11}$").expect("valid phone regex"));

/// 规范化印尼手机号为 +62 开头，接受 08xx / 628xx / +628xx，允许空格和连字符
pub fn normalize_id_phone(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    if let Some(rest) = cleaned.strip_prefix("+62") {
        format!("+62{rest}")
    } else if let Some(rest) = cleaned.strip_prefix("62") {
        format!("+62{rest}")
    } else if let Some(rest) = cleaned.strip_prefix('0') {
        format!("+62{rest}")
    } else {
        cleaned
    }
}

/// 校验并返回规范化后的手机号
pub fn validate_id_phone(phone: &str) -> AppResult<String> {
    let normalized = normalize_id_phone(phone);
    if !ID_MOBILE.is_match(&normalized) {
        return Err(AppError::ValidationError(
            "Invalid phone number format, expected an Indonesian mobile number (08xx / +628xx)"
                .to_string(),
        ));
    }
    Ok(normalized)
}
