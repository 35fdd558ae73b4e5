// src/utils/student.rs

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").unwrap());

/// Derives the login name from the student's full name and phone number:
/// `first.last` plus the last four phone digits (e.g. "ravi.kumar6789").
pub fn generate_username(full_name: &str, phone: &str) -> Result<String, String> {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    if parts.len() < 2 {
        return Err("Full name must include first and last name".to_string());
    }

    let first = parts.first().unwrap().to_lowercase();
    let last = parts.last().unwrap().to_lowercase();
    let digits: String = phone.chars().skip(phone.chars().count().saturating_sub(4)).collect();

    Ok(format!("{}.{}{}", first, last, digits))
}

/// Splits the stored `promoted_to_class` value into `(class_level, stream)`.
///
/// "9" -> ("class9", "general"); "11 jee" -> ("class11", "jee");
/// "dropper neet" -> ("dropper", "neet").
pub fn parse_promoted_class(promoted_to_class: &str) -> Result<(String, String), String> {
    let parts: Vec<String> = promoted_to_class
        .split_whitespace()
        .map(|p| p.to_lowercase())
        .collect();

    match parts.as_slice() {
        [class_num] => Ok((format!("class{}", class_num), "general".to_string())),
        [class_num, stream] => {
            if class_num == "dropper" {
                Ok(("dropper".to_string(), stream.clone()))
            } else {
                Ok((format!("class{}", class_num), stream.clone()))
            }
        }
        _ => Err("Invalid promoted_to_class format".to_string()),
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_must_be_10_digits"))
    }
}

pub fn validate_promoted_class(value: &str) -> Result<(), ValidationError> {
    match value.trim() {
        "9" | "10" | "11" | "12" | "dropper" => Ok(()),
        _ => Err(ValidationError::new("invalid_class_selection")),
    }
}

/// Whether this class selection requires a stream at signup.
pub fn stream_required(promoted_to_class: &str) -> bool {
    matches!(promoted_to_class.trim(), "11" | "12" | "dropper")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_from_name_and_phone() {
        assert_eq!(
            generate_username("Ravi Kumar", "9876546789").unwrap(),
            "ravi.kumar6789"
        );
        // Middle names are dropped; first and last win.
        assert_eq!(
            generate_username("Anita Devi Sharma", "9000012345").unwrap(),
            "anita.sharma2345"
        );
    }

    #[test]
    fn username_requires_two_name_parts() {
        assert!(generate_username("Madonna", "9876543210").is_err());
    }

    #[test]
    fn promoted_class_parsing() {
        assert_eq!(
            parse_promoted_class("9").unwrap(),
            ("class9".to_string(), "general".to_string())
        );
        assert_eq!(
            parse_promoted_class("11 jee").unwrap(),
            ("class11".to_string(), "jee".to_string())
        );
        assert_eq!(
            parse_promoted_class("dropper neet").unwrap(),
            ("dropper".to_string(), "neet".to_string())
        );
        assert!(parse_promoted_class("11 jee extra").is_err());
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("98765").is_err());
        assert!(validate_phone("98765432101").is_err());
        assert!(validate_phone("98765abcde").is_err());
    }

    #[test]
    fn stream_requirement() {
        assert!(stream_required("11"));
        assert!(stream_required("dropper"));
        assert!(!stream_required("9"));
        assert!(!stream_required("10"));
    }
}
