use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Stateless credential policy checks.
///
/// The email check is syntactic only; it says nothing about deliverability.
pub struct CredentialValidator;

impl CredentialValidator {
    /// Check email shape: `local@domain.tld` with no whitespace and a single `@`.
    pub fn is_valid_email(email: &str) -> bool {
        !email.is_empty() && EMAIL_PATTERN.is_match(email)
    }

    /// Check password strength.
    ///
    /// Requires at least 8 characters including an uppercase letter, a
    /// lowercase letter, a digit, and a character that is neither.
    pub fn is_valid_password(password: &str) -> bool {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return false;
        }

        let has_upper = password.chars().any(char::is_uppercase);
        let has_lower = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_special = password
            .chars()
            .any(|c| !(c.is_alphabetic() || c.is_ascii_digit()));

        has_upper && has_lower && has_digit && has_special
    }
}
