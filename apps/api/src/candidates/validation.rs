//! Intake validation — pure checks applied to the candidate form before a
//! profile is created. Rules run in order and short-circuit at the first
//! failure; messages are returned verbatim to the form.

/// Validates the six required intake fields. Order matters:
/// 1. all fields non-empty
/// 2. email has a `local@domain.tld` shape
/// 3. phone is exactly 10 digits
pub fn validate_intake(
    full_name: &str,
    email: &str,
    phone: &str,
    desired_position: &str,
    location: &str,
    tech_stack: &str,
) -> Result<(), String> {
    let required = [
        full_name,
        email,
        phone,
        desired_position,
        location,
        tech_stack,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err("Please fill in all required fields.".to_string());
    }
    if !is_plausible_email(email) {
        return Err("Invalid email address. Please enter a valid email.".to_string());
    }
    if !is_ten_digit_phone(phone) {
        return Err(
            "Invalid phone number. Please enter a valid 10-digit phone number.".to_string(),
        );
    }
    Ok(())
}

/// Minimal `local@domain.tld` shape check. Intentionally loose — the email
/// is an identity string for display and uniqueness, not a deliverability
/// guarantee.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn is_ten_digit_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

/// Splits the comma-separated tech stack field, trimming each entry.
/// Empty entries (e.g. from a trailing comma) are kept, not filtered:
/// downstream code treats them as a harmless no-op topic.
pub fn split_tech_stack(raw: &str) -> Vec<String> {
    raw.split(',').map(|t| t.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_intake_passes() {
        assert!(validate_intake(
            "Jane",
            "jane@x.com",
            "1234567890",
            "Engineer",
            "NY",
            "Python, SQL"
        )
        .is_ok());
    }

    #[test]
    fn test_missing_field_message() {
        let err = validate_intake("", "jane@x.com", "1234567890", "Engineer", "NY", "Python")
            .unwrap_err();
        assert_eq!(err, "Please fill in all required fields.");
    }

    #[test]
    fn test_whitespace_only_field_is_missing() {
        let err = validate_intake("Jane", "jane@x.com", "1234567890", "   ", "NY", "Python")
            .unwrap_err();
        assert_eq!(err, "Please fill in all required fields.");
    }

    #[test]
    fn test_bad_email_message() {
        let err = validate_intake("Jane", "bad-email", "1234567890", "Engineer", "NY", "Python")
            .unwrap_err();
        assert!(err.contains("Invalid email address"));
    }

    #[test]
    fn test_email_without_tld_rejected() {
        let err = validate_intake("Jane", "jane@x", "1234567890", "Engineer", "NY", "Python")
            .unwrap_err();
        assert!(err.contains("Invalid email address"));
    }

    #[test]
    fn test_phone_too_short_rejected() {
        let err =
            validate_intake("Jane", "jane@x.com", "12345", "Engineer", "NY", "Python").unwrap_err();
        assert!(err.contains("Invalid phone number"));
    }

    #[test]
    fn test_phone_with_letters_rejected() {
        let err = validate_intake("Jane", "jane@x.com", "12345abcde", "Engineer", "NY", "Python")
            .unwrap_err();
        assert!(err.contains("Invalid phone number"));
    }

    #[test]
    fn test_field_order_empty_beats_bad_email() {
        // Rule 1 fires before rule 2 even when both would fail.
        let err = validate_intake("Jane", "bad-email", "", "Engineer", "NY", "Python").unwrap_err();
        assert_eq!(err, "Please fill in all required fields.");
    }

    #[test]
    fn test_split_tech_stack_trims_entries() {
        assert_eq!(
            split_tech_stack("Python, SQL ,  React"),
            vec!["Python", "SQL", "React"]
        );
    }

    #[test]
    fn test_split_tech_stack_keeps_empty_trailing_entry() {
        assert_eq!(split_tech_stack("Python,SQL,"), vec!["Python", "SQL", ""]);
    }

    #[test]
    fn test_split_tech_stack_keeps_duplicates_and_order() {
        assert_eq!(
            split_tech_stack("SQL, Python, SQL"),
            vec!["SQL", "Python", "SQL"]
        );
    }
}
