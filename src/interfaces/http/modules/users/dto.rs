//! User DTOs

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserDraft};

/// User API representation, including the age derived at read time
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(value_type = String, format = Date, example = "2000-01-01")]
    pub date_of_birth: NaiveDate,
    /// Whole years elapsed since `dateOfBirth`
    pub age: i32,
    pub phone_number: String,
}

impl UserDto {
    /// Project `user` as seen on `today`.
    pub fn project(user: User, today: NaiveDate) -> Self {
        let age = user.age_on(today);
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            date_of_birth: user.date_of_birth,
            age,
            phone_number: user.phone_number,
        }
    }
}

/// Create / replace request body
///
/// Every field is optional on the wire so that missing values surface as
/// validation violations rather than parse errors. `id` is ignored on
/// create and must equal the path id on update.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// `YYYY-MM-DD`; a full timestamp is accepted and truncated to its date
    #[serde(default, deserialize_with = "deserialize_birth_date")]
    #[schema(value_type = Option<String>, format = Date, example = "2000-01-01")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl From<UserRequest> for UserDraft {
    fn from(r: UserRequest) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            first_name: r.first_name.unwrap_or_default(),
            last_name: r.last_name.unwrap_or_default(),
            email: r.email.unwrap_or_default(),
            date_of_birth: r.date_of_birth,
            phone_number: r.phone_number.unwrap_or_default(),
        }
    }
}

/// The zero date `0001-01-01` counts as "not provided".
fn deserialize_birth_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let date = parse_birth_date(raw.trim()).ok_or_else(|| {
        <D::Error as de::Error>::custom(format!(
            "invalid dateOfBirth '{raw}', expected YYYY-MM-DD"
        ))
    })?;

    Ok((!is_zero_date(date)).then_some(date))
}

fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

fn is_zero_date(date: NaiveDate) -> bool {
    date.year() == 1 && date.ordinal() == 1
}
