use crate::error::Result;

/// Hashes a password or PIN with bcrypt.
pub fn hash_password(secret: &str) -> Result<String> {
    let hash = bcrypt::hash(secret, bcrypt::DEFAULT_COST)?;
    Ok(hash)
}

/// Checks a password or PIN against its stored hash.
pub fn verify_password(secret: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(secret, hash)?)
}
