//! Phone number normalization for the SMS channel

use phonenumber::{Mode, PhoneNumber};

/// Parse and validate a number, returning its E.164 form
///
/// Numbers must carry a country code (`+` prefix); spaces, dashes and
/// parentheses are tolerated.
pub fn to_e164(phone: &str) -> Result<String, String> {
    let trimmed = phone.trim();
    if !trimmed.starts_with('+') {
        return Err("Phone number must be in E.164 format (e.g., +14155550123)".to_string());
    }

    let parsed = trimmed
        .parse::<PhoneNumber>()
        .map_err(|e| format!("Invalid phone number format: {}", e))?;

    if !phonenumber::is_valid(&parsed) {
        return Err("Phone number is not valid for its region".to_string());
    }

    Ok(parsed.format().mode(Mode::E164).to_string())
}
