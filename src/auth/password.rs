use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// Hash a password as `sha256$<salt>$<hex digest>` with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}", SCHEME, salt, digest(&salt, password))
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(salt), Some(expected)) if !salt.is_empty() && !expected.is_empty() => {
            constant_time_eq(digest(salt, password).as_bytes(), expected.as_bytes())
        }
        _ => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("agua-potable");
        assert!(stored.starts_with("sha256$"));
        assert!(verify_password("agua-potable", &stored));
        assert!(!verify_password("agua-potablE", &stored));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "x"));
        assert!(!verify_password("x", "md5$salt$abc"));
        assert!(!verify_password("x", "sha256$$abc"));
        assert!(!verify_password("x", "sha256$salt$"));
    }

    #[test]
    fn known_digest() {
        // sha256("s:p")
        let stored = format!("sha256$s${}", digest("s", "p"));
        assert!(verify_password("p", &stored));
        assert_eq!(digest("s", "p").len(), 64);
    }
}
