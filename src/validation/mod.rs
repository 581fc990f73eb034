//! Request validation: required-field presence plus small shape predicates.
//!
//! `validate_email` and `validate_phone` have no stored field behind them
//! yet. They are exported for callers of the library and are not wired
//! into any operation.

pub mod text;

pub use text::{
    comment_text, to_invalid_input_error, validate_comment_text, validate_text_data, validate_text_update,
    CreateTextInput, TextValidationResult, COMMENT_MAX_CHARS, CONTENT_MAX_CHARS, CONTENT_SHORT_CHARS,
    TITLE_MAX_CHARS,
};

use serde_json::Value;

use crate::error::{ErrorKind, MessageError};

/// Check that each field in `fields` is present, non-null and not an empty
/// string. Stops at the first offending field, in the order given.
pub fn validate_required_fields(data: &Value, fields: &[&str]) -> Result<(), MessageError> {
    for field in fields {
        let missing = match data.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };

        if missing {
            return Err(ErrorKind::InvalidInput
                .error()
                .with_detail("field", *field)
                .with_detail("message", format!("Le champ {} est requis", field)));
        }
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and a single `@`
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Needs a dot with something on both sides somewhere in the domain
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Optional leading `+`, then 1-16 digits not starting with 0.
/// Spaces, dashes and parentheses are ignored.
pub fn validate_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let mut chars = digits.chars();

    match chars.next() {
        Some(first) if ('1'..='9').contains(&first) => {}
        _ => return false,
    }

    digits.len() <= 16 && chars.all(|c| c.is_ascii_digit())
}

/// `None` or empty is accepted (optional field), otherwise exactly `#RRGGBB`
pub fn validate_optional_hex_color(color: Option<&str>) -> bool {
    match color {
        None => true,
        Some("") => true,
        Some(color) => {
            color.len() == 7
                && color.starts_with('#')
                && color[1..].chars().all(|c| c.is_ascii_hexdigit())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_fields_pass_when_present() {
        let data = json!({"workspaceToken": "t", "content": "hello"});
        assert!(validate_required_fields(&data, &["workspaceToken", "content"]).is_ok());
    }

    #[test]
    fn required_fields_short_circuit_on_first_missing() {
        let data = json!({"other": 1});
        let err = validate_required_fields(&data, &["a", "b"]).unwrap_err();
        assert_eq!(err.code, "INVALID_INPUT");
        let details = err.details.unwrap();
        assert_eq!(details["field"], json!("a"));
        assert_eq!(details["message"], json!("Le champ a est requis"));
    }

    #[test]
    fn required_fields_reject_null_and_empty_string() {
        let data = json!({"a": null, "b": ""});
        let err = validate_required_fields(&data, &["b", "a"]).unwrap_err();
        assert_eq!(err.details.unwrap()["field"], json!("b"));

        let err = validate_required_fields(&data, &["a"]).unwrap_err();
        assert_eq!(err.details.unwrap()["field"], json!("a"));
    }

    #[test]
    fn required_fields_accept_falsy_non_string_values() {
        let data = json!({"count": 0, "flag": false, "list": []});
        assert!(validate_required_fields(&data, &["count", "flag", "list"]).is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("ada@example.com"));
        assert!(validate_email("a.b+c@sub.example.org"));
        assert!(!validate_email("ada@example"));
        assert!(!validate_email("ada example@x.com"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("ada@@example.com"));
        assert!(!validate_email("ada@.com"));
    }

    #[test]
    fn phone_shapes() {
        assert!(validate_phone("+33 6 12 34 56 78"));
        assert!(validate_phone("(555) 123-4567"));
        assert!(validate_phone("7"));
        assert!(!validate_phone("0612345678"));
        assert!(!validate_phone("+"));
        assert!(!validate_phone("12ab"));
        assert!(!validate_phone("12345678901234567"));
    }

    #[test]
    fn hex_color_is_optional_but_strict() {
        assert!(validate_optional_hex_color(None));
        assert!(validate_optional_hex_color(Some("")));
        assert!(validate_optional_hex_color(Some("#A1b2C3")));
        assert!(!validate_optional_hex_color(Some("A1B2C3")));
        assert!(!validate_optional_hex_color(Some("#FFF")));
        assert!(!validate_optional_hex_color(Some("#GG0000")));
        assert!(!validate_optional_hex_color(Some("#0000000")));
    }
}
