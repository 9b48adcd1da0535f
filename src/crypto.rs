//! Credential hashing utilities

/// Default bcrypt cost factor
pub const BCRYPT_COST: u32 = 12;

/// Generate a fresh per-user salt
pub fn generate_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Hash a password with bcrypt, mixing in the stored per-user salt
pub fn hash_password(password: &str, salt: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(format!("{password}{salt}"), BCRYPT_COST)
}

/// Verify a password against a stored (salt, hash) pair
pub fn verify_password(
    password: &str,
    salt: &str,
    hash: &str,
) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(format!("{password}{salt}"), hash)
}
