//! Bearer token 检查
//!
//! 客户端不持有签名密钥，只读取 JWT 的 `exp` 声明来提前发现过期会话。
//! 非 JWT 的不透明 token 不做判断，交给后端返回 401。

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// 读取 JWT 的过期时间，无法解析或没有 `exp` 时返回 None
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims
        .exp
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
}

/// token 是否已确定过期
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    token_expiry(token).is_some_and(|expiry| expiry <= now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    fn jwt(exp: i64) -> String {
        encode(
            &Header::default(),
            &Claims {
                sub: "adm-1".to_string(),
                exp,
            },
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_reads_expiry_without_the_signing_key() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        assert_eq!(token_expiry(&jwt(exp)).unwrap().timestamp(), exp);
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now();
        assert!(is_token_expired(&jwt((now - Duration::minutes(5)).timestamp()), now));
        assert!(!is_token_expired(&jwt((now + Duration::minutes(5)).timestamp()), now));
    }

    #[test]
    fn test_opaque_token_is_never_expired() {
        assert_eq!(token_expiry("3f9c2a-opaque-session"), None);
        assert!(!is_token_expired("3f9c2a-opaque-session", Utc::now()));
    }
}
