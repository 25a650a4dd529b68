use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

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
pub fn generate_access_token(
    user_id: u64,
    role: u8,
    tenant_id: &str,
    employee_id: Option<u64>,
    secret: &str,
) -> String {
    use crate::models::TokenType;
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = Claims {
        user_id,
        sub: format!("user-{user_id}"),
        role,
        exp: (chrono::Utc::now().timestamp() + 900) as usize,
        jti: format!("jti-{user_id}"),
        token_type: TokenType::Access,
        tenant_id: tenant_id.to_string(),
        employee_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let token = generate_access_token(5, 3, "acme", Some(1000), "secret");
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.tenant_id, "acme");
        assert_eq!(claims.employee_id, Some(1000));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_access_token(5, 3, "acme", Some(1000), "secret");
        assert!(verify_token(&token, "other").is_err());
    }
}
