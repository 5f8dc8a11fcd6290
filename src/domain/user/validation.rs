//! User validation rules
//!
//! Every rule runs on every call; violations come back in field order
//! (first name, last name, email, date of birth, phone number) so clients
//! can show them all at once.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use validator::{ValidateEmail, ValidateLength};

use super::model::{shift_years, UserDraft};

/// Upper bound for first and last name, in characters.
pub const MAX_NAME_LENGTH: u64 = 128;

/// Minimum age, in whole years, a user must have reached.
pub const MINIMUM_AGE_YEARS: i32 = 18;

pub const MINIMUM_AGE_MESSAGE: &str = "User must be at least 18 years old.";
pub const PHONE_FORMAT_MESSAGE: &str = "Phone number must be 10 digits.";

/// Which rule a field broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    NotEmpty,
    MaxLength,
    Email,
    MinimumAge,
    PhoneFormat,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotEmpty => "notEmpty",
            Self::MaxLength => "maxLength",
            Self::Email => "email",
            Self::MinimumAge => "minimumAge",
            Self::PhoneFormat => "phoneFormat",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level reason a draft was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field name as it appears on the wire (`firstName`, ...)
    pub field: &'static str,
    pub rule: Rule,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            field,
            rule,
            message: message.into(),
        }
    }

    fn not_empty(field: &'static str, label: &str) -> Self {
        Self::new(field, Rule::NotEmpty, format!("'{label}' must not be empty."))
    }
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"))
}

/// Whether someone born on `date_of_birth` is at least eighteen on `today`.
pub fn is_adult_on(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    shift_years(today, -MINIMUM_AGE_YEARS).is_some_and(|cutoff| date_of_birth <= cutoff)
}

/// Check `draft` against every rule and return all violations.
///
/// An empty vector means the draft is valid. The age rule is evaluated
/// against `today`, so the same draft may pass on a later date.
pub fn validate_user(draft: &UserDraft, today: NaiveDate) -> Vec<Violation> {
    let mut violations = Vec::new();

    if draft.first_name.is_empty() {
        violations.push(Violation::not_empty("firstName", "First Name"));
    }
    check_max_length(&mut violations, "firstName", "First Name", &draft.first_name);
    check_max_length(&mut violations, "lastName", "Last Name", &draft.last_name);

    if draft.email.is_empty() {
        violations.push(Violation::not_empty("email", "Email"));
    }
    if !draft.email.validate_email() {
        violations.push(Violation::new(
            "email",
            Rule::Email,
            "'Email' is not a valid email address.",
        ));
    }

    match draft.date_of_birth {
        None => violations.push(Violation::not_empty("dateOfBirth", "Date Of Birth")),
        Some(dob) if !is_adult_on(dob, today) => violations.push(Violation::new(
            "dateOfBirth",
            Rule::MinimumAge,
            MINIMUM_AGE_MESSAGE,
        )),
        Some(_) => {}
    }

    if draft.phone_number.is_empty() {
        violations.push(Violation::not_empty("phoneNumber", "Phone Number"));
    }
    if !phone_pattern().is_match(&draft.phone_number) {
        violations.push(Violation::new(
            "phoneNumber",
            Rule::PhoneFormat,
            PHONE_FORMAT_MESSAGE,
        ));
    }

    violations
}

fn check_max_length(
    violations: &mut Vec<Violation>,
    field: &'static str,
    label: &str,
    value: &str,
) {
    if !value.validate_length(None, Some(MAX_NAME_LENGTH), None) {
        violations.push(Violation::new(
            field,
            Rule::MaxLength,
            format!(
                "The length of '{label}' must be {MAX_NAME_LENGTH} characters or fewer. \
                 You entered {} characters.",
                value.chars().count()
            ),
        ));
    }
}
