//! Input validation for request payloads
//!
//! Handlers reject malformed input before anything reaches the pricing
//! engine or the database. Messages are returned to the dashboard as-is.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Validation result type
pub type ValidationResult = Result<(), String>;

const MAX_TEXT_LEN: usize = 500;

/// Largest amount a `NUMERIC(12, 2)` column holds
pub const MAX_MONEY: Decimal = dec!(9999999999.99);

/// Non-blank text up to a sane length
pub fn require_text(field: &str, value: &str) -> ValidationResult {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(format!("{} must not be empty", field));
    }

    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(format!("{} must be at most {} characters", field, MAX_TEXT_LEN));
    }

    Ok(())
}

/// Money in the range the database stores: `0..=MAX_MONEY`
pub fn require_money(field: &str, value: Decimal) -> ValidationResult {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("{} must not be negative", field));
    }
    if value > MAX_MONEY {
        return Err(format!("{} must be at most {}", field, MAX_MONEY));
    }
    Ok(())
}

/// At least one entry must be selected
pub fn require_selection<T>(field: &str, values: &[T]) -> ValidationResult {
    if values.is_empty() {
        return Err(format!("{} must contain at least one entry", field));
    }
    Ok(())
}

/// Phone numbers: 8-15 digits, common separators allowed
pub fn validate_phone(phone: &str) -> ValidationResult {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Err("phone must not be empty".into());
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || " +-()".contains(c))
    {
        return Err("phone may only contain digits, spaces and + - ( )".into());
    }

    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    if !(8..=15).contains(&digits) {
        return Err("phone must have between 8 and 15 digits".into());
    }

    Ok(())
}

/// Loose email check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> ValidationResult {
    let trimmed = email.trim();

    if trimmed.len() > 254 {
        return Err("email is too long".into());
    }

    let (local, domain) = trimmed
        .split_once('@')
        .ok_or_else(|| "email must contain @".to_string())?;

    if local.is_empty() || domain.contains('@') {
        return Err("email is not valid".into());
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("email domain is not valid".into());
    }

    Ok(())
}
