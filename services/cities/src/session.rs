//! Session token service
//!
//! Session tokens are HS256 JWTs signed with a server-side secret. The claims
//! carry the user id in `sub`, the session namespace in `aud` and the issuance
//! time in `iat`. Expiry is checked against an explicit clock so callers (and
//! tests) control what "now" means.

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Default namespace tag, also used as the cookie name
pub const DEFAULT_NAMESPACE: &str = "user_session";

/// Default validity window in seconds
pub const DEFAULT_MAX_AGE_SECONDS: i64 = 3600;

/// Session token configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret used to sign tokens
    pub secret: String,
    /// Purpose tag bound into every token
    pub namespace: String,
    /// Token validity window in seconds
    pub max_age_seconds: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("max_age_seconds", &self.max_age_seconds)
            .finish()
    }
}

impl SessionConfig {
    /// Configuration with the default namespace and validity window
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }

    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_SECRET`: Secret used to sign session tokens (required)
    /// - `SESSION_NAMESPACE`: Namespace tag and cookie name (default: "user_session")
    /// - `SESSION_MAX_AGE`: Token validity in seconds (default: 3600)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable not set"))?;

        if secret.trim().is_empty() {
            anyhow::bail!("SESSION_SECRET must not be empty");
        }

        let namespace =
            std::env::var("SESSION_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());

        let max_age_seconds = std::env::var("SESSION_MAX_AGE")
            .unwrap_or_else(|_| DEFAULT_MAX_AGE_SECONDS.to_string())
            .parse()
            .unwrap_or(DEFAULT_MAX_AGE_SECONDS);

        Ok(SessionConfig {
            secret,
            namespace,
            max_age_seconds,
        })
    }
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Session namespace
    pub aud: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Outcome of validating a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// Signature and age check out
    Valid(Uuid),
    /// Well-formed and correctly signed, but older than the validity window
    Expired,
    /// Malformed, signed with another key, or issued for another namespace
    Invalid,
}

impl TokenStatus {
    /// The user id carried by a valid token
    pub fn user_id(self) -> Option<Uuid> {
        match self {
            TokenStatus::Valid(id) => Some(id),
            TokenStatus::Expired | TokenStatus::Invalid => None,
        }
    }
}

/// Session token service
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: SessionConfig,
}

impl SessionService {
    /// Initialize a new session token service
    pub fn new(config: SessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // Age is checked against the caller's clock in `validate_at`
        validation.validate_exp = false;
        validation.set_audience(&[config.namespace.as_str()]);
        validation.set_required_spec_claims(&["sub", "aud", "iat", "exp"]);

        SessionService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a token for a user, stamped with the current time
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Issue a token for a user, stamped with the given unix time
    pub fn issue_at(&self, user_id: Uuid, now: i64) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            aud: self.config.namespace.clone(),
            iat: now,
            exp: now + self.config.max_age_seconds,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token against the current time
    pub fn validate(&self, token: &str) -> TokenStatus {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token against the given unix time
    pub fn validate_at(&self, token: &str, now: i64) -> TokenStatus {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                match e.kind() {
                    ErrorKind::InvalidSignature => debug!("Session token signature mismatch"),
                    ErrorKind::InvalidAudience => debug!("Session token namespace mismatch"),
                    _ => debug!("Malformed session token: {}", e),
                }
                return TokenStatus::Invalid;
            }
        };

        if now.saturating_sub(claims.iat) > self.config.max_age_seconds {
            debug!("Session token for user {} expired", claims.sub);
            return TokenStatus::Expired;
        }

        TokenStatus::Valid(claims.sub)
    }

    /// Session cookie name
    pub fn cookie_name(&self) -> &str {
        &self.config.namespace
    }

    /// Token validity window in seconds
    pub fn max_age_seconds(&self) -> i64 {
        self.config.max_age_seconds
    }
}
