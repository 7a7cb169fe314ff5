//! Normalised API error and the outcome view built on it.
//!
//! Every failure leaving the client core is exactly one [`ApiError`]: a
//! human-readable message, optional field-level validation messages, and the
//! HTTP status the backend answered with.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Status reported when the transport produced no HTTP response.
pub const DEFAULT_STATUS_CODE: u16 = 400;

/// Last-resort message when neither the body nor the transport describe the failure.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Message used when the backend sends an empty field-error mapping.
pub const VALIDATION_FALLBACK_MESSAGE: &str = "Validation error";

/// Field name to message mapping, kept in the order the backend sent it.
///
/// # Examples
/// ```
/// use gateway::domain::FieldErrors;
///
/// let errors: FieldErrors = [("email", "Invalid"), ("password", "Too short")]
///     .into_iter()
///     .collect();
/// assert_eq!(errors.first().map(|(_, msg)| msg), Some("Invalid"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    /// Build from a decoded JSON object. Non-string values are rendered as JSON text.
    #[must_use]
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        object
            .iter()
            .map(|(field, value)| {
                let message = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (field.clone(), message)
            })
            .collect()
    }

    /// The first `(field, message)` pair in backend order.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &str)> {
        self.0
            .first()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Message attached to `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Iterate over `(field, message)` pairs in backend order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Number of fields carrying an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field carries an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldErrors
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (field, message) in iter {
            let field = field.into();
            let message = message.into();
            match entries.iter_mut().find(|(name, _)| *name == field) {
                Some(entry) => entry.1 = message,
                None => entries.push((field, message)),
            }
        }
        Self(entries)
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldErrorsVisitor;

        impl<'de> Visitor<'de> for FieldErrorsVisitor {
            type Value = FieldErrors;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of field names to messages")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((field, message)) = access.next_entry::<String, String>()? {
                    entries.push((field, message));
                }
                Ok(entries.into_iter().collect())
            }
        }

        deserializer.deserialize_map(FieldErrorsVisitor)
    }
}

/// Failure category derived from how the error was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The backend rejected one or more named inputs.
    FieldValidation,
    /// The backend answered with a single human-readable failure.
    Request,
    /// No response was received.
    Transport,
}

/// Validation errors emitted by [`ApiError::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiErrorValidationError {
    /// The message was blank once trimmed.
    #[error("error message must not be empty")]
    EmptyMessage,
}

/// Normalised API error.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
/// - `field_errors` is present exactly when the kind is
///   [`ErrorKind::FieldValidation`].
///
/// Serialises as `{ "message", "fieldErrors", "statusCode" }`.
///
/// # Examples
/// ```
/// use gateway::domain::{ApiError, ErrorKind};
///
/// let err = ApiError::request("User already exists", 409);
/// assert_eq!(err.kind(), ErrorKind::Request);
/// assert_eq!(err.status_code(), 409);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ApiErrorDto", into = "ApiErrorDto")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    field_errors: Option<FieldErrors>,
    status_code: u16,
}

impl ApiError {
    /// Fallible constructor for a request error that validates the message.
    pub fn try_new(
        message: impl Into<String>,
        status_code: u16,
    ) -> Result<Self, ApiErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ApiErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            kind: ErrorKind::Request,
            message,
            field_errors: None,
            status_code,
        })
    }

    /// Request error with a single message. Blank messages fall back to
    /// [`FALLBACK_MESSAGE`].
    pub fn request(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            kind: ErrorKind::Request,
            message: non_blank_or_fallback(message.into(), FALLBACK_MESSAGE),
            field_errors: None,
            status_code,
        }
    }

    /// Field validation error. The top-level message is the first field's message.
    #[must_use]
    pub fn validation(field_errors: FieldErrors, status_code: u16) -> Self {
        let first = field_errors
            .first()
            .map(|(_, message)| message.to_owned())
            .unwrap_or_default();
        Self {
            kind: ErrorKind::FieldValidation,
            message: non_blank_or_fallback(first, VALIDATION_FALLBACK_MESSAGE),
            field_errors: Some(field_errors),
            status_code,
        }
    }

    /// Transport failure with no HTTP response; status defaults to
    /// [`DEFAULT_STATUS_CODE`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: non_blank_or_fallback(message.into(), FALLBACK_MESSAGE),
            field_errors: None,
            status_code: DEFAULT_STATUS_CODE,
        }
    }

    /// Failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Field-level messages when the backend rejected named inputs.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// HTTP status, or [`DEFAULT_STATUS_CODE`] when none was received.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

fn non_blank_or_fallback(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorDto {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_errors: Option<FieldErrors>,
    status_code: u16,
}

impl From<ApiError> for ApiErrorDto {
    fn from(value: ApiError) -> Self {
        Self {
            message: value.message,
            field_errors: value.field_errors,
            status_code: value.status_code,
        }
    }
}

impl TryFrom<ApiErrorDto> for ApiError {
    type Error = ApiErrorValidationError;

    fn try_from(value: ApiErrorDto) -> Result<Self, Self::Error> {
        let ApiErrorDto {
            message,
            field_errors,
            status_code,
        } = value;

        let mut error = ApiError::try_new(message, status_code)?;
        if field_errors.is_some() {
            error.kind = ErrorKind::FieldValidation;
            error.field_errors = field_errors;
        }
        Ok(error)
    }
}

/// Pattern-matchable view over a client call result.
///
/// # Examples
/// ```
/// use gateway::domain::{ApiError, ApiOutcome};
///
/// let outcome: ApiOutcome<()> = Err(ApiError::request("nope", 401)).into();
/// assert!(matches!(outcome, ApiOutcome::GenericFailure { status_code: 401, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    /// The call succeeded with an unwrapped payload.
    Success(T),
    /// The backend rejected named inputs; map `field_errors` onto form fields.
    ValidationFailure {
        /// First field message, suitable for a form-level banner.
        message: String,
        /// Every field message in backend order.
        field_errors: FieldErrors,
        /// HTTP status of the rejection.
        status_code: u16,
    },
    /// Any other failure, including transport errors.
    GenericFailure {
        /// Human-readable message.
        message: String,
        /// HTTP status, or the default when no response was received.
        status_code: u16,
    },
}

impl<T> From<Result<T, ApiError>> for ApiOutcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(error) => {
                let ApiError {
                    message,
                    field_errors,
                    status_code,
                    ..
                } = error;
                match field_errors {
                    Some(field_errors) => Self::ValidationFailure {
                        message,
                        field_errors,
                        status_code,
                    },
                    None => Self::GenericFailure {
                        message,
                        status_code,
                    },
                }
            }
        }
    }
}
