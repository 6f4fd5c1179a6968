//! Message content for verification deliveries

use vt_core::{Delivery, Purpose};

/// Subject line for a purpose
pub fn subject(purpose: Purpose) -> &'static str {
    match purpose {
        Purpose::EmailConfirm => "Confirm your e-mail address",
        Purpose::PhoneConfirm => "Confirm your phone number",
        Purpose::PasswordReset => "Reset your password",
        Purpose::AccountAction => "Confirm your account action",
    }
}

/// Client link carrying the token as the `token` query parameter
pub fn verification_link(verify_url: &str, token: &str) -> String {
    let separator = if verify_url.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", verify_url, separator, token)
}

/// Plain text e-mail body
pub fn email_text(delivery: &Delivery, link: &str) -> String {
    format!(
        "Hello,\n\n{}: open the link below to continue. It expires at {} UTC.\n\n{}\n\nIf you did not request this, you can ignore this message.\n",
        subject(delivery.purpose),
        delivery.expires_at.format("%Y-%m-%d %H:%M"),
        link
    )
}

/// HTML e-mail body
pub fn email_html(delivery: &Delivery, link: &str) -> String {
    format!(
        "<p>Hello,</p><p>{}: open the link below to continue. It expires at {} UTC.</p><p><a href=\"{link}\">{link}</a></p><p>If you did not request this, you can ignore this message.</p>",
        subject(delivery.purpose),
        delivery.expires_at.format("%Y-%m-%d %H:%M"),
        link = link
    )
}

/// Short SMS body
pub fn sms_text(delivery: &Delivery, link: &str) -> String {
    format!("{}: {}", subject(delivery.purpose), link)
}
