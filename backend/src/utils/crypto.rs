use bcrypt::{hash, verify};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::AppError;
use crate::models::user::UNUSABLE_PASSWORD_PREFIX;

/// Bcrypt cost factor used unless configured otherwise
pub const DEFAULT_PASSWORD_COST: u32 = 12;

const UNUSABLE_PASSWORD_SUFFIX_LENGTH: usize = 40;

/// Hash a password using bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its hash. Unusable passwords never match.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return Ok(false);
    }

    verify(password, hash).map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}

/// A stored password value no input can match.
pub fn make_unusable_password() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UNUSABLE_PASSWORD_SUFFIX_LENGTH)
        .map(char::from)
        .collect();

    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, suffix)
}

/// Describe a stored hash for display without revealing it, e.g.
/// `algorithm: bcrypt cost: 12 salt: Ro0CUf****** hash: ******`.
pub fn password_summary(stored: &str) -> String {
    if stored.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return "No password set.".to_string();
    }

    // $2b$<cost>$<22 char salt><31 char hash>
    let mut parts = stored.splitn(4, '$').skip(1);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(variant), Some(cost), Some(rest)) if variant.starts_with('2') && rest.len() >= 22 => {
            format!(
                "algorithm: bcrypt cost: {} salt: {}****** hash: ******",
                cost,
                &rest[..6]
            )
        }
        _ => "Invalid password format or unknown hashing algorithm.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "correct horse battery staple";
        let hashed = hash_password(password, 4).unwrap();

        assert_ne!(password, hashed);
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong password", &hashed).unwrap());
    }

    #[test]
    fn test_unusable_password_never_verifies() {
        let unusable = make_unusable_password();

        assert!(unusable.starts_with(UNUSABLE_PASSWORD_PREFIX));
        assert_eq!(unusable.len(), 1 + UNUSABLE_PASSWORD_SUFFIX_LENGTH);
        assert!(!verify_password("", &unusable).unwrap());
        assert!(!verify_password(&unusable, &unusable).unwrap());
    }

    #[test]
    fn test_password_summary_hides_hash() {
        let hashed = hash_password("s3cret!", 4).unwrap();
        let summary = password_summary(&hashed);

        assert!(summary.starts_with("algorithm: bcrypt cost: 04 salt: "));
        assert!(!summary.contains(&hashed[29..]));
        assert_eq!(password_summary(&make_unusable_password()), "No password set.");
        assert_eq!(
            password_summary("plaintext"),
            "Invalid password format or unknown hashing algorithm."
        );
    }
}
