use agentova_api::validation::{validate_email, validate_optional_hex_color, validate_phone};

#[test]
fn contact_predicates_are_exported() {
    assert!(validate_email("contact@agentova.ai"));
    assert!(!validate_email("contact@agentova"));

    assert!(validate_phone("+33 1 23 45 67 89"));
    assert!(!validate_phone("01 23 45 67 89"));

    assert!(validate_optional_hex_color(None));
    assert!(validate_optional_hex_color(Some("#1A2b3C")));
    assert!(!validate_optional_hex_color(Some("1A2B3C")));
}
