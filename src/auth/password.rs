use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// A stored hash that fails to parse counts as a mismatch, not a panic;
/// pre-migration rows may hold foreign hash formats.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("ronda-malam");
        assert!(verify_password("ronda-malam", &hash));
        assert!(!verify_password("ronda-pagi", &hash));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
