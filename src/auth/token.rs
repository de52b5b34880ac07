use crate::{
    auth::StaffIdentity,
    error::{GatherError, TokenAction, TokenSnafu},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

///Claims carried by a staff bearer token - id, email and role, plus expiry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StaffClaims {
    pub sub: i32,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

impl From<StaffClaims> for StaffIdentity {
    fn from(
        StaffClaims {
            sub,
            email,
            role,
            exp: _,
        }: StaffClaims,
    ) -> Self {
        Self {
            id: sub,
            email,
            role,
        }
    }
}

pub fn issue_token(
    identity: &StaffIdentity,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, GatherError> {
    let expiry = (Utc::now() + Duration::hours(expiry_hours)).timestamp();

    let claims = StaffClaims {
        sub: identity.id,
        email: identity.email.clone(),
        role: identity.role.clone(),
        exp: expiry as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context(TokenSnafu {
        action: TokenAction::Issuing,
    })
}

///NB: returns the raw decode error - the gate logs it and falls back to the
///session rather than hard-failing the request.
pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<StaffClaims, jsonwebtoken::errors::Error> {
    decode::<StaffClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> StaffIdentity {
        StaffIdentity {
            id: 7,
            email: "toni@staff.com".into(),
            role: "Staff".into(),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let token = issue_token(&identity(), "secret", 24).unwrap();
        let claims = decode_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "toni@staff.com");
        assert_eq!(claims.role, "Staff");
    }

    #[test]
    fn expiry_is_roughly_24_hours_out() {
        let token = issue_token(&identity(), "secret", 24).unwrap();
        let claims = decode_token(&token, "secret").unwrap();

        let expected = (Utc::now() + Duration::hours(24)).timestamp() as usize;
        assert!(claims.exp.abs_diff(expected) < 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&identity(), "secret", 24).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = StaffClaims {
            sub: 7,
            email: "toni@staff.com".into(),
            role: "Staff".into(),
            exp: (Utc::now() - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(decode_token(&token, "secret").is_err());
    }
}
