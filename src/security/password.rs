//! bcrypt password hashes (`$2b$<cost>$...`).

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

pub fn hash_password(plain: &str) -> Result<String, BcryptError> {
    hash_password_with_cost(plain, DEFAULT_COST)
}

pub fn hash_password_with_cost(plain: &str, cost: u32) -> Result<String, BcryptError> {
    hash(plain, cost)
}

/// False for malformed hashes as well as wrong passwords.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    verify(plain, stored).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_hash() {
        let hash = hash_password_with_cost("correct horse", 4).unwrap();
        assert!(hash.starts_with("$2b$04$"));
        assert_eq!(hash.len(), 60);
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn default_cost_is_used() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with(&format!("$2b${:02}$", DEFAULT_COST)));
        assert!(verify_password("correct horse", &hash));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(
            hash_password_with_cost("same", 4).unwrap(),
            hash_password_with_cost("same", 4).unwrap()
        );
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plaintext"));
        assert!(!verify_password("x", "sha256$salt$abcdef"));
    }
}
