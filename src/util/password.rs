use crate::core::Error;
use bcrypt::DEFAULT_COST;

/// Hash a room password with bcrypt at the default cost
pub fn hash_password(password: &str) -> Result<String, Error> {
    bcrypt::hash(password, DEFAULT_COST).map_err(Error::Bcrypt)
}

/// Check a plaintext attempt against a stored hash; a corrupt hash is an error
pub fn verify_password(attempt: &str, hash: &str) -> Result<bool, Error> {
    bcrypt::verify(attempt, hash).map_err(Error::Bcrypt)
}

// ========================// tests //======================== //
