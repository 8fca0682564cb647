//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Longest prompt the studio accepts in description mode
pub const MAX_PROMPT_CHARS: usize = 3000;

/// Validate a phone number and return it without formatting characters
///
/// Numbers must carry their country code: a leading `+` followed by 4 to 15
/// digits. Spaces, dashes, dots and parentheses are stripped first.
pub fn normalize_phone_number(phone: &str) -> Result<String, String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }

    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+[0-9]{4,15}$").expect("Failed to compile phone regex"));

    if !regex.is_match(&compact) {
        return Err(format!(
            "Phone number {:?} must start with + and the country code, followed by digits only",
            phone
        ));
    }

    Ok(compact)
}

/// Validate the creative prompt
pub fn validate_prompt(prompt: &str) -> Result<(), String> {
    if prompt.trim().is_empty() {
        return Err("Prompt is required".to_string());
    }

    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(format!(
            "Prompt must be at most {} characters long",
            MAX_PROMPT_CHARS
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("+1000").unwrap(), "+1000");
        assert_eq!(
            normalize_phone_number(" +1 (555) 010-9999 ").unwrap(),
            "+15550109999"
        );
        assert_eq!(normalize_phone_number("+44.20.7946.0958").unwrap(), "+442079460958");
    }

    #[test]
    fn test_reject_invalid_phone_numbers() {
        assert!(normalize_phone_number("").is_err());
        assert!(normalize_phone_number("5550109999").is_err());
        assert!(normalize_phone_number("+12").is_err());
        assert!(normalize_phone_number("+1555abc").is_err());
        assert!(normalize_phone_number("+1234567890123456").is_err());
    }

    #[test]
    fn test_validate_prompt() {
        assert!(validate_prompt("lo-fi beat").is_ok());
        assert!(validate_prompt("   ").is_err());
        assert!(validate_prompt(&"a".repeat(MAX_PROMPT_CHARS + 1)).is_err());
    }
}
