//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes `invalid_request` with
//! `details = {field, code, value?}` so clients can highlight the input.

use serde_json::json;

use crate::domain::{
    Error, ListingId, ListingValidationError, LoginValidationError, MediaValidationError,
    RegistrationValidationError, UserType, UserValidationError, Username,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidField,
    InvalidUuid,
    InvalidImage,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidField => "invalid_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidImage => "invalid_image",
            ErrorCode::MalformedBody => "malformed_body",
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

    fn with_index(self, code: ErrorCode, index: usize) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Report every absent field at once; `field` names the first of them.
pub(crate) fn missing_fields_error(fields: &[FieldName]) -> Error {
    let names: Vec<&str> = fields.iter().map(FieldName::as_str).collect();
    let first = names.first().copied().unwrap_or("body");
    Error::invalid_request(format!("missing required fields: {}", names.join(", "))).with_details(
        json!({
            "field": first,
            "fields": names,
            "code": ErrorCode::MissingField.as_str(),
        }),
    )
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn malformed_body_error(message: impl Into<String>) -> Error {
    ValidationError::new("body", message).with_code(ErrorCode::MalformedBody)
}

pub(crate) fn parse_listing_id(value: &str, field: FieldName) -> Result<ListingId, Error> {
    value
        .parse::<ListingId>()
        .map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_username(value: &str, field: FieldName) -> Result<Username, Error> {
    Username::new(value).map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string())
            .with_value(ErrorCode::InvalidField, value)
    })
}

pub(crate) fn parse_user_type(value: &str, field: FieldName) -> Result<UserType, Error> {
    value.parse::<UserType>().map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string())
            .with_value(ErrorCode::InvalidField, value)
    })
}

pub(crate) fn listing_validation_error(err: ListingValidationError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(ErrorCode::InvalidField)
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::MissingField { .. } => ErrorCode::MissingField,
        _ => ErrorCode::InvalidField,
    };
    ValidationError::new(err.field(), err.to_string()).with_code(code)
}

pub(crate) fn registration_validation_error(err: RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::User(inner) => user_validation_error(inner),
        other => ValidationError::new(other.field(), other.to_string())
            .with_code(ErrorCode::InvalidField),
    }
}

pub(crate) fn login_validation_error(err: LoginValidationError) -> Error {
    let code = match err {
        LoginValidationError::EmptyUsername | LoginValidationError::EmptyPassword => {
            ErrorCode::MissingField
        }
        LoginValidationError::UnknownUserType(_) => ErrorCode::InvalidField,
    };
    ValidationError::new(err.field(), err.to_string()).with_code(code)
}

pub(crate) fn image_validation_error(field: FieldName, index: usize, err: MediaValidationError) -> Error {
    ValidationError::new(field.as_str(), err.to_string()).with_index(ErrorCode::InvalidImage, index)
}

#[cfg(test)]
mod tests {
    //! Mapping of validation failures to field-level error details.
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn invalid_uuid_reports_field_and_value() {
        let error = parse_listing_id("nope", FieldName::new("id")).expect_err("invalid");
        assert_eq!(error.message(), "id must be a valid UUID");
        assert_eq!(detail(&error, "field"), Some(&Value::from("id")));
        assert_eq!(detail(&error, "value"), Some(&Value::from("nope")));
        assert_eq!(detail(&error, "code"), Some(&Value::from("invalid_uuid")));
    }

    #[rstest]
    #[case(ListingValidationError::InvalidLatitude, "latitude")]
    #[case(ListingValidationError::EmptyField { field: "condition" }, "condition")]
    #[case(ListingValidationError::EmptyPatch, "body")]
    fn listing_errors_name_the_field(#[case] err: ListingValidationError, #[case] field: &str) {
        let error = listing_validation_error(err);
        assert_eq!(detail(&error, "field"), Some(&Value::from(field)));
    }

    #[rstest]
    fn missing_fields_are_listed_together() {
        let error = missing_fields_error(&[FieldName::new("condition"), FieldName::new("latitude")]);
        assert_eq!(
            error.message(),
            "missing required fields: condition, latitude"
        );
        assert_eq!(detail(&error, "field"), Some(&Value::from("condition")));
        assert_eq!(
            detail(&error, "fields"),
            Some(&serde_json::json!(["condition", "latitude"]))
        );
    }

    #[rstest]
    fn password_mismatch_points_at_confirmation() {
        let error = registration_validation_error(RegistrationValidationError::PasswordMismatch);
        assert_eq!(
            detail(&error, "field"),
            Some(&Value::from("confirm_password"))
        );
        assert_eq!(error.message(), "passwords do not match");
    }

    #[rstest]
    fn unknown_role_is_invalid_field() {
        let error = parse_user_type("admin", FieldName::new("type")).expect_err("unknown role");
        assert_eq!(detail(&error, "code"), Some(&Value::from("invalid_field")));
        assert_eq!(detail(&error, "value"), Some(&Value::from("admin")));
    }

    #[rstest]
    fn image_errors_carry_index() {
        let error = image_validation_error(
            FieldName::new("images"),
            1,
            MediaValidationError::EmptyImage,
        );
        assert_eq!(detail(&error, "index"), Some(&Value::from(1)));
        assert_eq!(error.message(), "image must not be empty");
    }
}
