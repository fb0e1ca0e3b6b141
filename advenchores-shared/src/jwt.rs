use jsonwebtoken::{self, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by every session token. `uid` is the owning account id that
/// all family records are keyed on; `jti` names the server-side session row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtClaims {
    pub sub: String,
    pub uid: i32,
    pub jti: String,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    Decode(String),
    #[error("encoding failed: {0}")]
    Encode(String),
}

pub fn decode_and_verify(token: &str, secret: &[u8]) -> Result<JwtClaims, JwtError> {
    let key = DecodingKey::from_secret(secret);
    let validation = Validation::new(Algorithm::HS256);
    jsonwebtoken::decode::<JwtClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::Decode(e.to_string()))
}

pub fn encode(claims: &JwtClaims, secret: &[u8]) -> Result<String, JwtError> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| JwtError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> JwtClaims {
        JwtClaims {
            sub: "parent".into(),
            uid: 7,
            jti: "session-1".into(),
            exp,
        }
    }

    fn far_future() -> i64 {
        // 2100-01-01
        4_102_444_800
    }

    #[test]
    fn verifies_token_signed_with_same_secret() {
        let token = encode(&claims(far_future()), b"s3cret").unwrap();
        let decoded = decode_and_verify(&token, b"s3cret").unwrap();
        assert_eq!(decoded.uid, 7);
        assert_eq!(decoded.jti, "session-1");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = encode(&claims(far_future()), b"s3cret").unwrap();
        assert!(matches!(
            decode_and_verify(&token, b"other"),
            Err(JwtError::Decode(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let token = encode(&claims(1_000), b"s3cret").unwrap();
        assert!(decode_and_verify(&token, b"s3cret").is_err());
    }
}
