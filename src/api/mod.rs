//! Request and response shapes for each endpoint.
//!
//! Requests deserialize into structs of `Option`s so that absent fields can be
//! reported per field; `validate_*` functions turn them into service inputs.
//! Responses are built from models with `From` impls.

pub mod json;
pub mod path;
pub mod pdd;
pub mod user;
pub mod video;

pub use json::AppJson;
pub use path::AppPath;

use serde::{Deserialize, Deserializer};

use crate::error::{FieldErrors, REQUIRED};

const NOT_NULL: &str = "This field may not be null.";

/// Serde adapter for `Option<Option<T>>` fields: absent is `None`, `null` is `Some(None)`.
/// Use with `#[serde(default, deserialize_with = "present")]`.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Reject an explicit `null`; an absent field stays `None`
pub(crate) fn not_null<T>(errors: &mut FieldErrors, field: &str, value: Option<Option<T>>) -> Option<T> {
    match value {
        Some(None) => {
            errors.insert(field.to_string(), NOT_NULL.to_string());
            None
        }
        Some(Some(value)) => Some(value),
        None => None,
    }
}

/// Required and not `null`
pub(crate) fn require_not_null<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<T>>,
) -> Option<T> {
    match value {
        None => require(errors, field, None),
        given => not_null(errors, field, given),
    }
}

/// Record "required" for an absent field and pass the value through otherwise
pub(crate) fn require<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.insert(field.to_string(), REQUIRED.to_string());
    }
    value
}
