use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(password_hash)
}

/// Checks `plain` against a stored hash. Besides Argon2 PHC strings this
/// accepts the unsalted hex SHA-256 digests written by older deployments;
/// new hashes are never produced in that format.
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, argon2::password_hash::Error> {
    if is_legacy_sha256(hashed) {
        let digest = hex::encode(Sha256::digest(plain.as_bytes()));
        return Ok(digest.as_bytes().ct_eq(hashed.as_bytes()).into());
    }

    let parsed_hash = PasswordHash::new(hashed)?;
    let ok = Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(ok)
}

fn is_legacy_sha256(hashed: &str) -> bool {
    hashed.len() == 64 && hashed.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
