//! Masking helpers for values that end up in logs

/// Mask a delivery destination or subject identifier for logging
///
/// E-mail addresses keep the first character of the local part and the
/// domain (`a****@example.com`). Phone-like values keep the first three and
/// last four digits (`+86****5678`). Anything else keeps its first and last
/// character.
pub fn mask_destination(value: &str) -> String {
    if let Some((local, domain)) = value.split_once('@') {
        let first: String = local.chars().take(1).collect();
        return format!("{}****@{}", first, domain);
    }

    if looks_like_phone(value) {
        let normalized = normalize_phone_number(value);
        if normalized.len() >= 7 {
            return format!(
                "{}****{}",
                &normalized[..3],
                &normalized[normalized.len() - 4..]
            );
        }
        return "****".to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => String::new(),
        1..=2 => "****".to_string(),
        n => format!("{}****{}", chars[0], chars[n - 1]),
    }
}

/// Strip formatting characters from a phone number
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn looks_like_phone(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'))
        && value.chars().any(|c| c.is_ascii_digit())
}
