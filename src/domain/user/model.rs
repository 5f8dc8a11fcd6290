//! User domain entity

use chrono::{Datelike, Months, NaiveDate};

use super::validation::validate_user;
use crate::shared::{DomainError, DomainResult};

/// A stored user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier assigned by the store on creation
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    /// Exactly ten ASCII digits
    pub phone_number: String,
}

impl User {
    /// Whole years elapsed since birth as of `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        age_on(self.date_of_birth, today)
    }
}

/// A user that passed validation and has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
}

impl NewUser {
    pub fn with_id(self, id: i32) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            date_of_birth: self.date_of_birth,
            phone_number: self.phone_number,
        }
    }
}

/// Candidate user as submitted by a client, before validation.
///
/// `id` is only meaningful for updates; `date_of_birth` is `None` when the
/// client left it out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: String,
}

impl UserDraft {
    /// Run every rule against the draft and turn it into a [`NewUser`].
    ///
    /// All violations are collected into a single
    /// [`DomainError::Validation`].
    pub fn validate(self, today: NaiveDate) -> DomainResult<NewUser> {
        let violations = validate_user(&self, today);
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        // The not-empty rule guarantees a birth date at this point.
        let Some(date_of_birth) = self.date_of_birth else {
            return Err(DomainError::Validation(violations));
        };

        Ok(NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            date_of_birth,
            phone_number: self.phone_number,
        })
    }
}

/// Age in whole years on `today` for someone born on `date_of_birth`.
///
/// A birthday later in the current year than `today` is not counted yet.
/// Anniversaries of Feb 29 fall on Feb 28 in common years.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - date_of_birth.year();
    match shift_years(today, -years) {
        Some(anniversary) if date_of_birth > anniversary => years - 1,
        _ => years,
    }
}

/// `date` moved by `years` whole years, clamping to the end of the month.
pub(crate) fn shift_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let months = Months::new(years.unsigned_abs().checked_mul(12)?);
    if years >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_birthday_earlier_in_year() {
        assert_eq!(age_on(date(2000, 1, 1), date(2026, 10, 17)), 26);
    }

    #[test]
    fn age_excludes_birthday_later_in_year() {
        assert_eq!(age_on(date(2000, 12, 31), date(2026, 10, 17)), 25);
    }

    #[test]
    fn age_counts_birthday_today() {
        assert_eq!(age_on(date(2008, 10, 17), date(2026, 10, 17)), 18);
        assert_eq!(age_on(date(2008, 10, 18), date(2026, 10, 17)), 17);
    }

    #[test]
    fn leap_day_birthday_ages_on_feb_28() {
        assert_eq!(age_on(date(2008, 2, 29), date(2026, 2, 27)), 17);
        assert_eq!(age_on(date(2008, 2, 29), date(2026, 2, 28)), 17);
        assert_eq!(age_on(date(2008, 2, 29), date(2026, 3, 1)), 18);
    }

    #[test]
    fn new_user_with_id_keeps_fields() {
        let new_user = NewUser {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@example.com".into(),
            date_of_birth: date(2000, 1, 1),
            phone_number: "1234567890".into(),
        };
        let user = new_user.clone().with_id(7);
        assert_eq!(user.id, 7);
        assert_eq!(user.email, new_user.email);
        assert_eq!(user.age_on(date(2026, 1, 1)), 26);
    }

    #[test]
    fn validate_returns_new_user_for_valid_draft() {
        let draft = UserDraft {
            id: 0,
            first_name: "John".into(),
            last_name: "".into(),
            email: "john.doe@example.com".into(),
            date_of_birth: Some(date(2000, 1, 1)),
            phone_number: "1234567890".into(),
        };
        let new_user = draft.validate(date(2026, 10, 17)).unwrap();
        assert_eq!(new_user.date_of_birth, date(2000, 1, 1));
    }

    #[test]
    fn validate_rejects_empty_draft() {
        let err = UserDraft::default().validate(date(2026, 10, 17)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(v) if !v.is_empty()));
    }
}
