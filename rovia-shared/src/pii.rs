use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer contact details for a reservation.
///
/// Debug output masks the email address and phone number so whole
/// reservation records can be passed to log macros like
/// `tracing::info!("{:?}", reservation)` without spilling PII.
/// Serialization keeps the real values - API responses and the
/// notification payload need them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl fmt::Debug for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contact")
            .field("name", &self.name)
            .field("email", &redact_email(&self.email))
            .field("phone", &redact_phone(&self.phone))
            .finish()
    }
}

/// Keeps the first character of the local part and the full domain:
/// `jane.doe@example.com` -> `j***@example.com`.
pub fn redact_email(addr: &str) -> String {
    match addr.split_once('@') {
        Some((local, domain)) => {
            let head = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", head, domain)
        }
        None => "***".to_string(),
    }
}

/// Keeps the last two digits: `+49 170 1234567` -> `***67`.
pub fn redact_phone(num: &str) -> String {
    let digits: Vec<char> = num.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 2 {
        return "***".to_string();
    }
    let tail: String = digits[digits.len() - 2..].iter().collect();
    format!("***{}", tail)
}
