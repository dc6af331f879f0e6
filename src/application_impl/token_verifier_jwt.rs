use crate::application_port::{AuthError, TokenVerifier};
use crate::domain_model::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // user id as string
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

/// Verifies HS256 access tokens minted by the identity provider.
pub struct JwtHs256Verifier {
    cfg: JwtConfig,
}

impl JwtHs256Verifier {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Verifier { cfg }
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &v,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;
        Ok(data.claims)
    }
}

#[async_trait::async_trait]
impl TokenVerifier for JwtHs256Verifier {
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = self.decode_access(token)?;
        claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    const KEY: &[u8] = b"test-signing-key";

    fn verifier() -> JwtHs256Verifier {
        JwtHs256Verifier::new(JwtConfig {
            issuer: "identity.test".to_string(),
            audience: "amity".to_string(),
            signing_key: KEY.to_vec(),
        })
    }

    fn token(sub: &str, iss: &str, exp_in: Duration, key: &[u8]) -> String {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: sub.to_string(),
            exp: (now + exp_in).timestamp(),
            iat: now.timestamp(),
            iss: iss.to_string(),
            aud: "amity".to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let id = UserId::new_v4();
        let t = token(&id.to_string(), "identity.test", Duration::minutes(5), KEY);
        assert_eq!(verifier().verify_token(&t).await.unwrap(), id);
    }

    #[tokio::test]
    async fn expired_token() {
        let id = UserId::new_v4();
        let t = token(&id.to_string(), "identity.test", Duration::hours(-1), KEY);
        assert!(matches!(
            verifier().verify_token(&t).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn wrong_issuer_key_or_subject() {
        let id = UserId::new_v4().to_string();
        let v = verifier();

        let t = token(&id, "someone.else", Duration::minutes(5), KEY);
        assert!(matches!(v.verify_token(&t).await, Err(AuthError::TokenInvalid)));

        let t = token(&id, "identity.test", Duration::minutes(5), b"other-key");
        assert!(matches!(v.verify_token(&t).await, Err(AuthError::TokenInvalid)));

        let t = token("not-a-uuid", "identity.test", Duration::minutes(5), KEY);
        assert!(matches!(v.verify_token(&t).await, Err(AuthError::TokenInvalid)));

        assert!(matches!(v.verify_token("garbage").await, Err(AuthError::TokenInvalid)));
    }
}
