//! Field rules for [`Contact`](super::Contact)
//!
//! Pure predicates, no logging. The setters call these and report failures.

/// Minimum number of digits in a phone number
pub const MIN_PHONE_LEN: usize = 11;

/// A name is valid when it is non-empty.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
}

/// A phone is valid when it has at least [`MIN_PHONE_LEN`] characters and every
/// character is an ASCII decimal digit.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() >= MIN_PHONE_LEN && phone.chars().all(|c| c.is_ascii_digit())
}

/// An email is valid when it is empty, or when:
///
/// - it contains no space,
/// - its first `@` is neither the first nor the last character,
/// - some `.` follows that `@`, not directly after it and not as the last
///   character.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() {
        return true;
    }
    if email.contains(' ') {
        return false;
    }

    let chars: Vec<char> = email.chars().collect();
    let last = chars.len() - 1;

    let at = match chars.iter().position(|&c| c == '@') {
        Some(at) if at != 0 && at != last => at,
        _ => return false,
    };

    chars
        .iter()
        .enumerate()
        .skip(at + 2)
        .any(|(i, &c)| c == '.' && i != last)
}

/// Human-readable reason a phone number was rejected
pub(crate) fn phone_violation(phone: &str) -> &'static str {
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        "phone must contain only numbers"
    } else {
        "phone number must be at least 11 digits"
    }
}
