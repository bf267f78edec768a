use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use rand_core::OsRng;

/// Hash a plaintext password with Argon2id into a PHC string.
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unreadable.
pub fn verify(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("Corrupt password hash: {}", e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext() {
        let hashed = hash("HASHED_PASSWORD").unwrap();
        assert_ne!(hashed, "HASHED_PASSWORD");
        assert!(hashed.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify() {
        let hashed = hash("hunter22").unwrap();
        assert!(verify("hunter22", &hashed).unwrap());
        assert!(!verify("hunter23", &hashed).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash("hunter22").unwrap(), hash("hunter22").unwrap());
    }

    #[test]
    fn test_verify_corrupt_hash() {
        assert!(verify("whatever", "not-a-phc-string").is_err());
    }
}
