use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;
use shared::{domain::Phone, session::SignInType};

const EMAIL_PATTERN: &str = r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#;
const PHONE_PATTERN: &str = r"^\(?([0-9]{3})\)?[-. ]?([0-9]{3})[-. ]?([0-9]{4})$";
const SIZE_UNITS: [&str; 5] = ["bytes", "kb", "MB", "GB", "TB"];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(&email.to_lowercase())
}

/// US ten-digit numbers, optionally written `(555) 123-4567`, `555.123.4567`
/// and so on.
pub fn is_invalid_phone(phone: &str) -> bool {
    !phone_regex().is_match(phone)
}

pub fn make_phone(phone: &str) -> Phone {
    let number = if phone.contains("+1") {
        phone.to_string()
    } else {
        format!("+1{phone}")
    };
    Phone {
        number,
        region_code: "US".to_string(),
    }
}

/// Studies without a phone sign-in enroll participants by external id.
pub fn is_sign_in_by_id(sign_in: Option<&[SignInType]>) -> bool {
    sign_in.map_or(true, |types| !types.contains(&SignInType::PhonePassword))
}

pub fn bytes_to_size(bytes: u64) -> String {
    if bytes == 0 {
        return "n/a".to_string();
    }
    let mut exponent = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && exponent < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }
    if exponent == 0 {
        format!("{bytes} {}", SIZE_UNITS[0])
    } else {
        format!("{scaled:.1}{}", SIZE_UNITS[exponent])
    }
}

pub fn get_search_params(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}
