use crate::error::AppError;
use bcrypt::{hash, verify};

/// Work factor for bcrypt. Each increment doubles the cost of a hash.
const BCRYPT_COST: u32 = 12;

/// Hashes a plaintext password with a per-call random salt.
///
/// This is the only place in the codebase where passwords are hashed; both the
/// registration and reset-password handlers call through here so the work
/// factor is applied exactly once.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a plaintext password against a stored bcrypt digest.
///
/// Returns `Ok(false)` on a mismatch; only a malformed digest or an internal
/// bcrypt failure produces an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
