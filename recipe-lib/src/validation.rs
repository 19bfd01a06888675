//! Field validation for request payloads.
//!
//! Payloads deserialize every field as an `Option<Field<_>>` and are checked here before anything
//! is written. A value of the wrong JSON type is kept as [Field::Invalid] instead of failing the
//! whole body, so it can be reported against its own path. Failures are collected per field path
//! (`title`, `tags.1.name`) so a single response can report all of them.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const NOT_A_LIST: &str = "Expected a list of items.";
pub const NOT_AN_OBJECT: &str = "Invalid data. Expected a dictionary.";

pub const MAX_LENGTH: usize = 255;
const MAX_DIGITS: u32 = 5;
const DECIMAL_PLACES: u32 = 2;

/// One payload value. `Invalid` holds the place of a value that was present but did not have
/// the expected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Valid(T),
    Invalid,
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Valid(value)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match T::deserialize(value) {
            Ok(value) => Field::Valid(value),
            Err(_) => Field::Invalid,
        })
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Valid(value) => value.serialize(serializer),
            Field::Invalid => serializer.serialize_none(),
        }
    }
}

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> ValidationErrors {
        ValidationErrors::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Adds `nested` under `prefix`, so `name` becomes `prefix.name`.
    pub fn extend_nested(&mut self, prefix: &str, nested: ValidationErrors) {
        for (field, messages) in nested.0 {
            self.0
                .entry(format!("{}.{}", prefix, field))
                .or_default()
                .extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    /// `Ok(value)` if nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Unwraps a field, recording `invalid` for a wrongly typed value and a missing value when
/// `required` is set.
pub fn present<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<T>>,
    required: bool,
    invalid: &str,
) -> Option<T> {
    match value {
        Some(Field::Valid(value)) => Some(value),
        Some(Field::Invalid) => {
            errors.add(field, invalid);
            None
        }
        None => {
            if required {
                errors.add(field, REQUIRED);
            }
            None
        }
    }
}

/// An integer field.
pub fn integer_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<i32>>,
    required: bool,
) -> Option<i32> {
    present(errors, field, value, required, INVALID_INTEGER)
}

/// A non-blank string of at most 255 characters, stored without surrounding whitespace.
pub fn char_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<String>>,
    required: bool,
) -> Option<String> {
    let value = present(errors, field, value, required, INVALID_STRING)?;
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    check_max_length(errors, field, value);
    Some(value.to_owned())
}

/// Like [char_field] but an empty string is allowed.
pub fn optional_char_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<String>>,
) -> Option<String> {
    let value = text_field(errors, field, value)?;
    check_max_length(errors, field, &value);
    Some(value)
}

/// Trimmed free text of any length, possibly empty.
pub fn text_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<String>>,
) -> Option<String> {
    let value = present(errors, field, value, false, INVALID_STRING)?;
    Some(value.trim().to_owned())
}

fn check_max_length(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.chars().count() > MAX_LENGTH {
        errors.add(
            field,
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_LENGTH
            ),
        );
    }
}

/// A decimal with at most 5 digits, 2 of them after the point. Accepted values are rescaled to
/// two places.
pub fn decimal_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<Decimal>>,
    required: bool,
) -> Option<Decimal> {
    let value = present(errors, field, value, required, INVALID_NUMBER)?;
    if let Some(message) = decimal_error(value) {
        errors.add(field, message);
        return None;
    }
    let mut value = value.normalize();
    value.rescale(DECIMAL_PLACES);
    Some(value)
}

fn decimal_error(value: Decimal) -> Option<String> {
    let normalized = value.normalize();
    let mantissa_digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let scale = normalized.scale();
    let (digits, decimals) = if normalized.is_zero() {
        (0, 0)
    } else if scale > mantissa_digits {
        (scale, scale)
    } else {
        (mantissa_digits, scale)
    };

    if digits > MAX_DIGITS {
        Some(format!(
            "Ensure that there are no more than {} digits in total.",
            MAX_DIGITS
        ))
    } else if decimals > DECIMAL_PLACES {
        Some(format!(
            "Ensure that there are no more than {} decimal places.",
            DECIMAL_PLACES
        ))
    } else if digits - decimals > MAX_DIGITS - DECIMAL_PLACES {
        Some(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            MAX_DIGITS - DECIMAL_PLACES
        ))
    } else {
        None
    }
}

/// Validates every item of a nested list. Failures are reported as `field.<index>.<item field>`,
/// or as `field.<index>` when the item is not an object.
pub fn nested_list<P, T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<Vec<Field<P>>>>,
    validate: impl Fn(P) -> Result<T, ValidationErrors>,
) -> Option<Vec<T>> {
    let items = present(errors, field, value, false, NOT_A_LIST)?;
    let mut valid = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let path = format!("{}.{}", field, index);
        match item {
            Field::Valid(item) => match validate(item) {
                Ok(item) => valid.push(item),
                Err(nested) => errors.extend_nested(&path, nested),
            },
            Field::Invalid => errors.add(&path, NOT_AN_OBJECT),
        }
    }
    Some(valid)
}

/// Lower-cases the domain of an email address, keeping the local part as given.
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.trim().to_owned(),
    }
}

/// A normalized email address with a non-empty local part and domain.
pub fn email_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<String>>,
    required: bool,
) -> Option<String> {
    let value = char_field(errors, field, value, required)?;
    let email = normalize_email(&value);
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(email),
        _ => {
            errors.add(field, INVALID_EMAIL);
            None
        }
    }
}

/// A non-blank string of at least `min_length` characters. Whitespace is kept as given.
pub fn password_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Field<String>>,
    required: bool,
    min_length: usize,
) -> Option<String> {
    let value = present(errors, field, value, required, INVALID_STRING)?;
    if value.trim().is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() < min_length {
        errors.add(
            field,
            format!(
                "Ensure this field has at least {} characters.",
                min_length
            ),
        );
        return None;
    }
    Some(value)
}
