use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT payload. `sub` carries the username, `id` the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub id: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}

/// Verified caller identity extracted from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

/// Any verification failure: bad signature, malformed token, missing claims or expiry.
#[derive(Debug, Error)]
#[error("invalid token: {0}")]
pub struct InvalidToken(#[from] jsonwebtoken::errors::Error);

/// Signing and verification keys, built once from config at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue(&self, user_id: Uuid, username: &str, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: username.to_owned(),
            id: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn issue_access(&self, user_id: Uuid, username: &str) -> anyhow::Result<String> {
        self.issue(user_id, username, self.access_ttl)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, InvalidToken> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.sub.is_empty() {
            return Err(InvalidToken(ErrorKind::InvalidSubject.into()));
        }
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(Identity {
            user_id: data.claims.id,
            username: data.claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 20,
        })
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let user_id = Uuid::new_v4();
        let token = keys.issue_access(user_id, "alice").expect("sign");
        let identity = keys.verify(&token).expect("verify");
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn access_ttl_comes_from_config() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert_eq!(keys.access_ttl(), Duration::minutes(20));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys
            .issue(Uuid::new_v4(), "alice", Duration::seconds(-5))
            .expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err.0.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let good = make_keys("secret-a", "iss", "aud");
        let other = make_keys("secret-b", "iss", "aud");
        let token = other.issue_access(Uuid::new_v4(), "mallory").unwrap();
        let err = good.verify(&token).unwrap_err();
        assert!(matches!(err.0.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue_access(Uuid::new_v4(), "alice").unwrap();
        let forged_payload = keys.issue_access(Uuid::new_v4(), "bob").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged: Vec<&str> = forged_payload.split('.').collect();
        parts[1] = forged[1];
        assert!(keys.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue_access(Uuid::new_v4(), "alice").unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert!(keys.verify("not.a.jwt").is_err());
        assert!(keys.verify("").is_err());
    }

    #[test]
    fn token_without_id_claim_is_rejected() {
        #[derive(Serialize)]
        struct Partial<'a> {
            sub: &'a str,
            exp: usize,
            iss: &'a str,
            aud: &'a str,
        }
        let keys = make_keys("dev-secret", "iss", "aud");
        let exp = (OffsetDateTime::now_utc() + Duration::minutes(5)).unix_timestamp() as usize;
        let token = encode(
            &Header::new(ALGORITHM),
            &Partial { sub: "alice", exp, iss: "iss", aud: "aud" },
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn token_with_empty_subject_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue_access(Uuid::new_v4(), "").unwrap();
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err.0.kind(), ErrorKind::InvalidSubject));
    }
}
