//! JWT verification
//!
//! Tokens are issued elsewhere; this service only verifies them. Claims carry
//! the user id, display name and role.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Shared secret (at least 32 bytes in production)
    pub secret: String,
    /// Expected token issuer
    pub issuer: String,
    /// Expected token audience
    pub audience: String,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                tracing::warn!("JWT_SECRET is shorter than 32 bytes");
                std::env::var("JWT_SECRET").unwrap_or_default()
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using development key");
                "cantina-development-key-must-be-replaced".to_string()
            }
        };

        Self {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "cantina-auth".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "cantina-clients".to_string()),
        }
    }
}

/// Claims carried by a verified token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (subject)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Role, `"admin"` or `"customer"`
    pub role: String,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,
}

/// Token verification service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    /// Verify and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Extract the bearer token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Authenticated user, parsed from verified claims and injected into request
/// extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-test-secret-test-secret-ok".to_string(),
            issuer: "cantina-auth".to_string(),
            audience: "cantina-clients".to_string(),
        }
    }

    fn issue(config: &JwtConfig, role: &str, exp_offset_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "user123".to_string(),
            name: "Maria".to_string(),
            role: role.to_string(),
            exp: now + exp_offset_secs,
            iat: now,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("token")
    }

    #[test]
    fn test_valid_token_yields_claims() {
        let config = config();
        let service = JwtService::new(config.clone());
        let token = issue(&config, "customer", 3600);

        let claims = service.validate_token(&token).expect("claims");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.name, "Maria");
        assert!(!CurrentUser::from(claims).is_admin());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = config();
        let service = JwtService::new(config.clone());
        let token = issue(&config, "customer", -3600);

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = config();
        let token = issue(&config, "customer", 3600);

        let other = JwtService::new(JwtConfig {
            secret: "another-secret-another-secret-another".to_string(),
            ..config
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_admin_role_detection() {
        let config = config();
        let service = JwtService::new(config.clone());
        let token = issue(&config, "admin", 3600);

        let user = CurrentUser::from(service.validate_token(&token).unwrap());
        assert!(user.is_admin());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
