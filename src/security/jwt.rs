//! Access and refresh token issuance.
//!
//! The issuer is stateless: given a secret, an algorithm and the two TTLs it
//! mints and verifies tokens without touching storage. Verification failures
//! are always `None`, never an error; only encoding failures during creation
//! are fatal.
//!
//! Issuance is a capability of the boundary layer. The login flow does not
//! call it yet; see DESIGN.md.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token. Refresh tokens omit the email claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: String,
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted token with its id and expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Access + refresh token pair as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer over a shared HMAC secret.
    pub fn new(secret: &str, algorithm: Algorithm, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    pub fn from_config(config: &JwtConfig) -> anyhow::Result<Self> {
        let algorithm: Algorithm = config
            .algorithm
            .parse()
            .map_err(|_| anyhow::anyhow!("unsupported JWT algorithm: {}", config.algorithm))?;
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {}
            other => anyhow::bail!("only HMAC algorithms are supported, got {other:?}"),
        }
        Ok(Self::new(
            &config.secret,
            algorithm,
            config.access_token_ttl,
            config.refresh_token_ttl,
        ))
    }

    pub fn create_access_token(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        email: &str,
    ) -> Result<IssuedToken> {
        self.mint(
            TokenKind::Access,
            user_id,
            tenant_id,
            Some(email.to_string()),
            self.access_ttl,
        )
    }

    pub fn create_refresh_token(&self, user_id: Uuid, tenant_id: Uuid) -> Result<IssuedToken> {
        self.mint(TokenKind::Refresh, user_id, tenant_id, None, self.refresh_ttl)
    }

    /// Mint both tokens. Returns the pair plus each token's jti so the
    /// caller can index them for future revocation.
    pub fn create_token_pair(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        email: &str,
    ) -> Result<(TokenPair, String, String)> {
        let access = self.create_access_token(user_id, tenant_id, email)?;
        let refresh = self.create_refresh_token(user_id, tenant_id)?;

        let pair = TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
        };
        Ok((pair, access.jti, refresh.jti))
    }

    fn mint(
        &self,
        kind: TokenKind,
        user_id: Uuid,
        tenant_id: Uuid,
        email: Option<String>,
        ttl: Duration,
    ) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let jti = Uuid::new_v4().to_string();

        let payload = TokenPayload {
            sub: user_id.to_string(),
            tenant_id: tenant_id.to_string(),
            email,
            kind,
            jti: jti.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(self.algorithm),
            &payload,
            &self.encoding_key,
        )
        .map_err(AppError::internal)?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Verify the signature and structural shape only. Expiry is checked by
    /// [`verify`](Self::verify), not here.
    pub fn decode(&self, token: &str) -> Option<TokenPayload> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<TokenPayload>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims)
    }

    /// Decode, then reject tokens of the wrong kind or past their expiry.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Option<TokenPayload> {
        let payload = self.decode(token)?;
        if payload.kind != expected {
            return None;
        }
        if payload.exp < Utc::now().timestamp() {
            return None;
        }
        Some(payload)
    }

    /// Seconds until expiry; 0 for undecodable or expired tokens.
    pub fn remaining_seconds(&self, token: &str) -> i64 {
        match self.decode(token) {
            Some(payload) => (payload.exp - Utc::now().timestamp()).max(0),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Algorithm::HS256, 900, 604800)
    }

    #[test]
    fn test_access_token_round_trip() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let issued = issuer
            .create_access_token(user_id, tenant_id, "a@b.com")
            .unwrap();
        let payload = issuer.verify(&issued.token, TokenKind::Access).unwrap();

        assert_eq!(payload.sub, user_id.to_string());
        assert_eq!(payload.tenant_id, tenant_id.to_string());
        assert_eq!(payload.email.as_deref(), Some("a@b.com"));
        assert_eq!(payload.jti, issued.jti);
        assert_eq!(payload.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_refresh_token_has_no_email_claim() {
        let issuer = issuer();
        let issued = issuer
            .create_refresh_token(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();
        let payload = issuer.verify(&issued.token, TokenKind::Refresh).unwrap();
        assert!(payload.email.is_none());
    }

    #[test]
    fn test_verify_rejects_wrong_kind() {
        let issuer = issuer();
        let issued = issuer
            .create_access_token(Uuid::new_v4(), Uuid::new_v4(), "a@b.com")
            .unwrap();
        assert!(issuer.verify(&issued.token, TokenKind::Refresh).is_none());
        // decode itself still succeeds
        assert!(issuer.decode(&issued.token).is_some());
    }

    #[test]
    fn test_verify_rejects_expired() {
        // Negative TTL mints an already-expired token.
        let issuer = TokenIssuer::new("test-secret", Algorithm::HS256, -60, -60);
        let issued = issuer
            .create_access_token(Uuid::new_v4(), Uuid::new_v4(), "a@b.com")
            .unwrap();
        assert!(issuer.verify(&issued.token, TokenKind::Access).is_none());
        assert_eq!(issuer.remaining_seconds(&issued.token), 0);
        // Signature still checks out, so decode returns the payload.
        assert!(issuer.decode(&issued.token).is_some());
    }

    #[test]
    fn test_decode_rejects_tampered_signature() {
        let issuer = issuer();
        let other = TokenIssuer::new("other-secret", Algorithm::HS256, 900, 604800);
        let issued = issuer
            .create_access_token(Uuid::new_v4(), Uuid::new_v4(), "a@b.com")
            .unwrap();
        assert!(other.decode(&issued.token).is_none());
        assert!(other.verify(&issued.token, TokenKind::Access).is_none());
        assert_eq!(other.remaining_seconds(&issued.token), 0);
    }

    #[test]
    fn test_decode_garbage_is_none() {
        let issuer = issuer();
        assert!(issuer.decode("not.a.token").is_none());
        assert_eq!(issuer.remaining_seconds(""), 0);
    }

    #[test]
    fn test_token_pair_shape() {
        let issuer = issuer();
        let (pair, access_jti, refresh_jti) = issuer
            .create_token_pair(Uuid::new_v4(), Uuid::new_v4(), "a@b.com")
            .unwrap();
        assert_eq!(pair.token_type, "bearer");
        assert_eq!(pair.expires_in, 900);
        assert_ne!(access_jti, refresh_jti);

        let access = issuer.verify(&pair.access_token, TokenKind::Access).unwrap();
        let refresh = issuer
            .verify(&pair.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(access.jti, access_jti);
        assert_eq!(refresh.jti, refresh_jti);
    }

    #[test]
    fn test_remaining_seconds_close_to_ttl() {
        let issuer = issuer();
        let issued = issuer
            .create_access_token(Uuid::new_v4(), Uuid::new_v4(), "a@b.com")
            .unwrap();
        let remaining = issuer.remaining_seconds(&issued.token);
        assert!(remaining > 895 && remaining <= 900);
    }
}
