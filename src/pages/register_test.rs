use super::*;

#[test]
fn accepts_valid_input_and_trims_username() {
    assert_eq!(
        validate_register_input(" carol ", "pass", "pass"),
        Ok(("carol".to_owned(), "pass".to_owned()))
    );
}

#[test]
fn username_is_required_and_at_least_three_characters() {
    assert_eq!(validate_register_input("  ", "pass", "pass"), Err("Username is required"));
    assert_eq!(
        validate_register_input(" ab ", "pass", "pass"),
        Err("Username must be at least 3 characters")
    );
}

#[test]
fn username_length_counts_characters_not_bytes() {
    assert_eq!(
        validate_register_input("éé", "pass", "pass"),
        Err("Username must be at least 3 characters")
    );
    assert!(validate_register_input("ééé", "pass", "pass").is_ok());
}

#[test]
fn password_is_required_and_at_least_four_characters() {
    assert_eq!(validate_register_input("carol", "    ", "    "), Err("Password is required"));
    assert_eq!(
        validate_register_input("carol", "abc", "abc"),
        Err("Password must be at least 4 characters")
    );
}

#[test]
fn confirmation_must_match() {
    assert_eq!(validate_register_input("carol", "pass", "pasS"), Err("Passwords do not match"));
}
