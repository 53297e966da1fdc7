//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose `details` carry the
//! offending `field`, a machine-readable `code`, and where useful the raw
//! `value` and list `index`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::{
    Email, Error, Note, PlaceId, Prefecture, ProjectId, SelectionPlacement,
    SelectionValidationError, UserId, parse_prefectures,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidEmail,
    InvalidValue,
    UnknownPrefecture,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::UnknownPrefecture => "unknown_prefecture",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Wrap a domain validation message so it points at `field`.
pub(crate) fn invalid_field_error(field: FieldName, message: impl ToString) -> Error {
    ValidationError::new(field.as_str(), message.to_string()).with_code(ErrorCode::InvalidValue)
}

/// Like [`invalid_field_error`] for an element of a list field.
pub(crate) fn invalid_item_error(
    field: FieldName,
    index: usize,
    value: impl Into<String>,
    message: impl ToString,
) -> Error {
    ValidationError::new(field.as_str(), message.to_string()).with_index(
        ErrorCode::InvalidValue,
        index,
        value,
    )
}

fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must contain valid UUIDs")).with_index(
        ErrorCode::InvalidUuid,
        index,
        value,
    )
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_place_id(value: &str, field: FieldName) -> Result<PlaceId, Error> {
    PlaceId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Path segments that are not UUIDs cannot name a project, so they read as
/// missing rather than malformed.
pub(crate) fn parse_project_path(value: &str) -> Result<ProjectId, Error> {
    ProjectId::new(value).map_err(|_| Error::not_found("project not found"))
}

pub(crate) fn parse_user_id_list(values: &[String], field: FieldName) -> Result<Vec<UserId>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            UserId::new(value).map_err(|_| invalid_uuid_index_error(field, index, value))
        })
        .collect()
}

pub(crate) fn parse_email(value: &str, field: FieldName) -> Result<Email, Error> {
    Email::new(value).map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string())
            .with_value(ErrorCode::InvalidEmail, value)
    })
}

pub(crate) fn parse_email_list(values: &[String], field: FieldName) -> Result<Vec<Email>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Email::new(value).map_err(|err| {
                ValidationError::new(field.as_str(), err.to_string()).with_index(
                    ErrorCode::InvalidEmail,
                    index,
                    value.as_str(),
                )
            })
        })
        .collect()
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        ValidationError::new(name, format!("{name} must be an ISO 8601 date (YYYY-MM-DD)"))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

pub(crate) fn parse_prefecture_list(
    values: &[String],
    field: FieldName,
) -> Result<Vec<Prefecture>, Error> {
    parse_prefectures(values).map_err(|(index, err)| {
        ValidationError::new(field.as_str(), err.to_string()).with_index(
            ErrorCode::UnknownPrefecture,
            index,
            err.value,
        )
    })
}

pub(crate) fn parse_note(value: Option<String>, field: FieldName) -> Result<Option<Note>, Error> {
    value
        .map(|raw| Note::new(raw).map_err(|err| invalid_field_error(field, err)))
        .transpose()
}

/// Name of the request field a placement error refers to.
fn placement_field(error: &SelectionValidationError) -> FieldName {
    match error {
        SelectionValidationError::DayIndexOutOfRange { .. } => FieldName::new("dayIndex"),
        SelectionValidationError::NegativeOrder => FieldName::new("orderInDay"),
    }
}

pub(crate) fn parse_placement(
    place_id: PlaceId,
    day_index: i64,
    order_in_day: i64,
    note: Option<Note>,
) -> Result<SelectionPlacement, Error> {
    SelectionPlacement::new(place_id, day_index, order_in_day, note)
        .map_err(|err| invalid_field_error(placement_field(&err), err))
}

/// Deserialise a field that distinguishes "absent" from `null`.
///
/// Use with `#[serde(default, deserialize_with = "present")]` on an
/// `Option<Option<T>>`: absent stays `None`, `null` becomes `Some(None)`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn uuid_list_errors_point_at_the_bad_entry() {
        let values = vec![
            "3fa85f64-5717-4562-b3fc-2c963f66afa6".to_owned(),
            "nope".to_owned(),
        ];
        let err = parse_user_id_list(&values, FieldName::new("friendIds")).expect_err("invalid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&err, "index"), Some(&Value::from(1)));
        assert_eq!(detail(&err, "code"), Some(&Value::from("invalid_uuid")));
    }

    #[rstest]
    fn unknown_prefectures_are_reported_with_index() {
        let values = vec!["東京都".to_owned(), "Atlantis".to_owned()];
        let err =
            parse_prefecture_list(&values, FieldName::new("prefectures")).expect_err("unknown");
        assert_eq!(detail(&err, "index"), Some(&Value::from(1)));
        assert_eq!(detail(&err, "value"), Some(&Value::from("Atlantis")));
        assert_eq!(detail(&err, "code"), Some(&Value::from("unknown_prefecture")));
    }

    #[rstest]
    #[case("2026-04-01", true)]
    #[case("2026-02-30", false)]
    #[case("01/04/2026", false)]
    fn dates_must_be_iso(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_date(raw, FieldName::new("startDate")).is_ok(), ok);
    }

    #[rstest]
    fn malformed_project_path_reads_as_not_found() {
        let err = parse_project_path("not-a-project").expect_err("not found");
        assert_eq!(err.code(), DomainCode::NotFound);
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "present")]
        note: Option<Option<String>>,
    }

    #[rstest]
    #[case(r#"{}"#, None)]
    #[case(r#"{"note": null}"#, Some(None))]
    #[case(r#"{"note": "hi"}"#, Some(Some("hi".to_owned())))]
    fn present_distinguishes_null_from_absent(
        #[case] raw: &str,
        #[case] expected: Option<Option<String>>,
    ) {
        let patch: Patch = serde_json::from_str(raw).expect("valid json");
        assert_eq!(patch.note, expected);
    }
}
