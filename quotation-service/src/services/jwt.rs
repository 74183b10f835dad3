use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::User;

/// JWT service for session token generation and validation.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    pub email: String,
    /// Display name
    pub name: String,
    /// Role ("admin" | "user")
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl JwtService {
    /// Create a new JWT service from the shared HS256 secret.
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            token_expiry_hours: config.token_expiry_hours,
        }
    }

    /// Generate a session token for a user.
    pub fn generate_token(&self, user: &User) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.token_expiry_hours);

        let claims = SessionClaims {
            sub: user.user_id.to_string(),
            email: user.email.clone(),
            name: user.display_name.clone(),
            role: user.role.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))?;

        Ok(token)
    }

    /// Validate and decode a session token.
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid session token: {}", e))?;

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds (for the cookie max-age).
    pub fn token_expiry_seconds(&self) -> i64 {
        self.token_expiry_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_user() -> User {
        User {
            user_id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            display_name: "Test User".to_string(),
            password_hash: "hash".to_string(),
            role: "admin".to_string(),
            active: true,
            last_login_utc: None,
            created_utc: Utc::now(),
            updated_utc: Utc::now(),
        }
    }

    fn test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-1234567890".to_string(),
            token_expiry_hours: 24,
        })
    }

    #[test]
    fn test_token_generation_and_validation() {
        let service = test_service();
        let user = test_user();

        let token = service.generate_token(&user).expect("Failed to generate token");
        assert!(!token.is_empty());

        let claims = service.validate_token(&token).expect("Failed to validate token");
        assert_eq!(claims.sub, user.user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.name, "Test User");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: "a-different-secret".to_string(),
            token_expiry_hours: 24,
        });

        let token = service.generate_token(&test_user()).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_token_expiry_seconds() {
        let service = test_service();
        assert_eq!(service.token_expiry_seconds(), 86400);
    }
}
