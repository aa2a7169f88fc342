//! Field rules shared by the user and post services.

use std::ops::RangeInclusive;

use super::error::DomainError;

pub const EMAIL_LENGTH: RangeInclusive<usize> = 6..=255;
pub const PASSWORD_LENGTH: RangeInclusive<usize> = 5..=255;
pub const USERNAME_LENGTH: RangeInclusive<usize> = 3..=255;
pub const TITLE_LENGTH: RangeInclusive<usize> = 8..=255;
pub const SLUG_LENGTH: RangeInclusive<usize> = 8..=255;
pub const CONTENT_MIN_LENGTH: usize = 500;

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    require("email", email)?;
    check_length("email", email, &EMAIL_LENGTH)?;

    let mut parts = email.split('@');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None)
            if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
    );
    if !well_formed {
        return Err(DomainError::validation("email", "must be a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    require("password", password)?;
    check_length("password", password, &PASSWORD_LENGTH)
}

pub fn validate_username(username: &str) -> Result<(), DomainError> {
    require("username", username)?;
    check_length("username", username, &USERNAME_LENGTH)
}

pub fn validate_title(title: &str) -> Result<(), DomainError> {
    require("title", title)?;
    check_length("title", title, &TITLE_LENGTH)
}

pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    require("slug", slug)?;
    check_length("slug", slug, &SLUG_LENGTH)
}

pub fn validate_content(content: &str) -> Result<(), DomainError> {
    require("content", content)?;
    if content.chars().count() < CONTENT_MIN_LENGTH {
        return Err(DomainError::validation(
            "content",
            "must be at least 500 characters long",
        ));
    }
    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    Ok(())
}

fn check_length(
    field: &'static str,
    value: &str,
    range: &RangeInclusive<usize>,
) -> Result<(), DomainError> {
    if range.contains(&value.chars().count()) {
        Ok(())
    } else {
        Err(DomainError::validation(field, "has an invalid length"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_single_at_with_both_sides() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("no-at-sign.example").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(validate_password("12345").is_ok());
        assert!(validate_password("1234").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_title("Exactly8").is_ok());
        assert!(validate_title(&"t".repeat(256)).is_err());
    }

    #[test]
    fn content_has_a_minimum_length() {
        assert!(validate_content(&"x".repeat(CONTENT_MIN_LENGTH)).is_ok());
        let err = validate_content(&"x".repeat(CONTENT_MIN_LENGTH - 1)).unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation {
                field: "content",
                message: "must be at least 500 characters long",
            }
        );
    }

    #[test]
    fn blank_field_reports_required() {
        let err = validate_slug("   ").unwrap_err();
        assert_eq!(err, DomainError::validation("slug", "is required"));
    }
}
