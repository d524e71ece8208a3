use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::role::Role;
use crate::model::rt::Rt;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Account email.
    pub sub: String,
    pub role: Role,
    /// Absent until the resident completes their profile.
    pub rt: Option<Rt>,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn generate_access_token(
    user_id: u64,
    email: String,
    role: Role,
    rt: Option<Rt>,
    secret: &str,
    ttl: usize,
) -> String {
    let claims = Claims {
        user_id,
        sub: email,
        role,
        rt,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Returns the claims too; the caller persists the jti for revocation.
pub fn generate_refresh_token(
    user_id: u64,
    email: String,
    role: Role,
    rt: Option<Rt>,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = Claims {
        user_id,
        sub: email,
        role,
        rt,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Refresh,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    (token, claims)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trips() {
        let token = generate_access_token(
            7,
            "budi@example.com".into(),
            Role::User,
            Some(Rt::Rt04),
            SECRET,
            900,
        );
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "budi@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.rt, Some(Rt::Rt04));
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_tokens_get_unique_jtis() {
        let (_, a) =
            generate_refresh_token(1, "a@x.com".into(), Role::Admin, None, SECRET, 3600);
        let (_, b) =
            generate_refresh_token(1, "a@x.com".into(), Role::Admin, None, SECRET, 3600);
        assert_ne!(a.jti, b.jti);
        assert_eq!(a.token_type, TokenType::Refresh);
    }

    #[test]
    fn wrong_secret_is_refused() {
        let token =
            generate_access_token(1, "a@x.com".into(), Role::User, None, SECRET, 900);
        assert!(verify_token(&token, "other-secret").is_err());
    }
}
