//! Field validation rules for user input.
use once_cell::sync::Lazy;
use regex::Regex;

/// Registration names: letters (with Spanish accents), digits, `& . , ' ’ -`
/// and whitespace, at least three characters.
pub fn is_valid_name(name: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Za-zÁÉÍÓÚÜáéíóúüÑñ0-9&.,'’\-\s]{3,}$").expect("valid regex")
    });
    RE.is_match(name)
}

/// Names on update are stricter: ASCII letters and whitespace only.
pub fn is_valid_update_name(name: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s]{3,}$").expect("valid regex"));
    RE.is_match(name)
}

/// ASCII-only: word characters before the `@`, letters, digits, `.` and
/// `-` in the domain.
pub fn is_valid_email(email: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex")
    });
    RE.is_match(email)
}

fn has_letter_and_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_alphabetic()) && password.chars().any(|c| c.is_ascii_digit())
}

/// Passwords on registration: 6 to 25 characters from letters, digits and
/// common symbols, with at least one letter and one digit.
pub fn is_valid_password(password: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"^[A-Za-z0-9!@#$%^&*()_+\-=\[\]\{\};':"\\|,.<>/?]{6,25}$"#)
            .expect("valid regex")
    });
    RE.is_match(password) && has_letter_and_digit(password)
}

/// Passwords on update and reset: alphanumeric, at least 6 characters, with
/// at least one letter and one digit.
pub fn is_valid_update_password(password: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{6,}$").expect("valid regex"));
    RE.is_match(password) && has_letter_and_digit(password)
}
