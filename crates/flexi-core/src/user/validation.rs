//! Registration form checks run before anything is sent to the backend.

use crate::error::{FlexiError, Result};

const MIN_PASSWORD_LEN: usize = 8;
const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Loose shape check: something, an `@`, something, a dot, something; no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// At least eight characters drawn from letters, digits and `@$!%*?&`,
/// with one lowercase letter, one uppercase letter and one digit.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Validates the registration form fields in the order the form shows them.
pub fn validate_registration(email: &str, password: &str, password_confirm: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(FlexiError::validation("Please enter a valid email address"));
    }
    if !is_strong_password(password) {
        return Err(FlexiError::validation(
            "Password must be at least 8 characters with uppercase, lowercase and a number",
        ));
    }
    if password != password_confirm {
        return Err(FlexiError::validation("Passwords do not match"));
    }
    Ok(())
}
