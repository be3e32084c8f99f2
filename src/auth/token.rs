use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of a session token issued at login.
pub const SESSION_TTL_HOURS: i64 = 2;
/// Lifetime of a password-reset token. Deliberately shorter than a session.
pub const RESET_TTL_HOURS: i64 = 1;

/// What a token authorizes. A reset token presented where a session token is
/// expected (or vice versa) is rejected as invalid.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Session,
    Reset,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// What the token authorizes.
    pub purpose: TokenPurpose,
}

/// Token verification failures, kept distinct so each maps to its own
/// caller-visible outcome (the auth middleware answers 401 with a message
/// per variant; the reset handler collapses both to a 400).
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    /// The token's ttl has elapsed.
    Expired,
    /// Tampered, malformed, wrong signature, or wrong purpose.
    Invalid,
    /// Server-side failure (e.g. missing secret), not the caller's fault.
    Internal(String),
}

fn secret() -> Result<String, TokenError> {
    std::env::var("JWT_SECRET").map_err(|_| TokenError::Internal("JWT_SECRET not set".into()))
}

/// Generates a signed JWT for a given user ID and purpose.
///
/// Session tokens live for [`SESSION_TTL_HOURS`], reset tokens for
/// [`RESET_TTL_HOURS`]. Requires the `JWT_SECRET` environment variable.
///
/// # Returns
/// A `Result` containing the JWT string if successful.
/// Returns `AppError::Internal` if `JWT_SECRET` is not set or if encoding fails.
pub fn issue_token(user_id: i32, purpose: TokenPurpose) -> Result<String, AppError> {
    let ttl_hours = match purpose {
        TokenPurpose::Session => SESSION_TTL_HOURS,
        TokenPurpose::Reset => RESET_TTL_HOURS,
    };

    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::hours(ttl_hours))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: expiration,
        purpose,
    };

    let secret = secret().map_err(|e| match e {
        TokenError::Internal(msg) => AppError::Internal(msg),
        _ => AppError::Internal("token secret unavailable".into()),
    })?;

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies a JWT string and decodes its claims.
///
/// Signature and expiry are checked by `jsonwebtoken`; the decoded purpose is
/// then matched against `expected`. Expiry and tampering are reported as
/// distinct [`TokenError`] variants.
pub fn verify_token(token: &str, expected: TokenPurpose) -> Result<Claims, TokenError> {
    let secret = secret()?;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    if claims.purpose != expected {
        return Err(TokenError::Invalid);
    }

    Ok(claims)
}
