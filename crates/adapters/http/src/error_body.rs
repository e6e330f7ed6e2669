//! 后端错误响应体解析

use console_errors::ProblemDetails;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// 提取面向用户的错误消息
///
/// 依次尝试 Problem Details 的 detail/title、`{"message": ..}`，最后退回状态码描述
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let problem = serde_json::from_str::<ProblemDetails>(body).ok();
    if let Some(message) = problem.as_ref().and_then(ProblemDetails::message) {
        return message.to_string();
    }

    if let Some(body) = serde_json::from_str::<MessageBody>(body)
        .ok()
        .filter(|b| !b.message.trim().is_empty())
    {
        return body.message;
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_detail_wins() {
        let body = r#"{"type":"about:blank","title":"Unauthorized","status":401,"detail":"Invalid username or password"}"#;
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, body),
            "Invalid username or password"
        );
    }

    #[test]
    fn test_message_body() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Account locked"}"#),
            "Account locked"
        );
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>upstream down</html>"),
            "Bad Gateway"
        );
    }
}
