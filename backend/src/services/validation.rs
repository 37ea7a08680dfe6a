use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username must be between 3 and 50 characters")]
    UsernameLength,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Password must contain at least one digit")]
    PasswordNeedsDigit,
    #[error("Password must contain at least one uppercase letter")]
    PasswordNeedsUppercase,
    #[error("Password must contain at least one lowercase letter")]
    PasswordNeedsLowercase,
    #[error("Password must contain at least one special character")]
    PasswordNeedsSpecial,
    #[error("Question cannot be empty")]
    EmptyQuestion,
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(ValidationError::UsernameLength);
    }
    Ok(())
}

/// Structural email check: one '@', non-empty local part, and a domain
/// containing a dot.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.contains(char::is_whitespace)
    {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNeedsDigit);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ValidationError::PasswordNeedsUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ValidationError::PasswordNeedsLowercase);
    }
    if !password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        return Err(ValidationError::PasswordNeedsSpecial);
    }
    Ok(())
}

pub fn validate_question(question: &str) -> Result<(), ValidationError> {
    if question.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    Ok(())
}
