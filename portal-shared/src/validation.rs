//! Shared form validation rules.
//!
//! Every form that writes to the document store runs through these functions
//! first. The rules are advisory: the hosted store does not enforce them, so
//! the services in this crate refuse to issue a write for input that fails
//! here.

use crate::models::profile::ProfileUpdate;
use crate::models::session::Credentials;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Minimum number of digits a contact number must contain.
pub const MIN_CONTACT_DIGITS: usize = 11;
/// Exact length of a wire sign.
pub const WIRE_SIGN_LEN: usize = 2;

/// Form field a [`ValidationError`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldName {
    Name,
    Email,
    Password,
    ConfirmPassword,
    WireSign,
    Contact,
    Title,
}

impl FieldName {
    /// Field key as used by the form inputs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::WireSign => "wireSign",
            Self::Contact => "contact",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rule {
    /// Empty after trimming.
    Required,
    /// Present but malformed.
    Format,
    /// Too short.
    Length,
    /// Confirmation differs from the original.
    Mismatch,
}

impl Rule {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Format => "format",
            Self::Length => "length",
            Self::Mismatch => "mismatch",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[error("{field}: {rule}")]
pub struct ValidationError {
    pub field: FieldName,
    pub rule: Rule,
}

impl ValidationError {
    #[must_use]
    pub const fn new(field: FieldName, rule: Rule) -> Self {
        Self { field, rule }
    }

    /// Text rendered next to the offending input.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match (self.field, self.rule) {
            (FieldName::Name, _) => "Please enter your name.",
            (FieldName::Email, Rule::Format) => "Please enter a valid email address.",
            (FieldName::Email, _) => "Please enter your email.",
            (FieldName::Password, Rule::Length) => "Password must be at least 8 characters.",
            (FieldName::Password, _) => "Please enter your password.",
            (FieldName::ConfirmPassword, Rule::Mismatch) => "Passwords do not match.",
            (FieldName::ConfirmPassword, _) => "Please confirm your password.",
            (FieldName::WireSign, Rule::Format) => "Wire Sign must be exactly 2 letters.",
            (FieldName::WireSign, _) => "Please enter your wire sign.",
            (FieldName::Contact, Rule::Format) => "Contact must contain at least 11 digits.",
            (FieldName::Contact, _) => "Please enter your contact number.",
            (FieldName::Title, _) => "Title is required.",
        }
    }
}

/// All failures found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// First failure recorded against `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: FieldName) -> Option<&ValidationError> {
        self.0.iter().find(|error| error.field == field)
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Record the error side of `result` and hand back the value, if any.
    pub fn capture<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trimmed value of a mandatory field.
///
/// # Errors
/// Returns `(field, required)` when the value is empty after trimming.
pub fn require(field: FieldName, value: &str) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, Rule::Required));
    }
    Ok(trimmed)
}

/// Validates a display name and returns it trimmed.
///
/// # Errors
/// Fails with `(name, required)`.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    require(FieldName::Name, name).map(str::to_string)
}

/// Validates an email address and returns it trimmed.
///
/// # Errors
/// Fails with `(email, required)` when empty and `(email, format)` when the
/// address has no `@`.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = require(FieldName::Email, email)?;
    if !trimmed.contains('@') {
        return Err(ValidationError::new(FieldName::Email, Rule::Format));
    }
    Ok(trimmed.to_string())
}

/// Validates a new password.
///
/// The password itself is never trimmed; only emptiness is judged on the
/// trimmed value.
///
/// # Errors
/// Fails with `(password, required)` or `(password, length)`.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    require(FieldName::Password, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(FieldName::Password, Rule::Length));
    }
    Ok(())
}

/// Validates that the confirmation equals the password exactly.
///
/// # Errors
/// Fails with `(confirmPassword, required)` or `(confirmPassword, mismatch)`.
pub fn validate_confirm_password(
    confirm_password: &str,
    password: &str,
) -> Result<(), ValidationError> {
    require(FieldName::ConfirmPassword, confirm_password)?;
    if confirm_password != password {
        return Err(ValidationError::new(
            FieldName::ConfirmPassword,
            Rule::Mismatch,
        ));
    }
    Ok(())
}

/// Validates a wire sign and returns it normalized to uppercase.
///
/// # Errors
/// Fails with `(wireSign, required)` or `(wireSign, format)` unless the trimmed
/// value is exactly two ASCII letters.
pub fn validate_wire_sign(wire_sign: &str) -> Result<String, ValidationError> {
    let trimmed = require(FieldName::WireSign, wire_sign)?;
    if !is_wire_sign(trimmed) {
        return Err(ValidationError::new(FieldName::WireSign, Rule::Format));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Validates a contact number and returns it trimmed.
///
/// Separators are allowed and kept; only digits count toward the minimum.
///
/// # Errors
/// Fails with `(contact, required)` or `(contact, format)`.
pub fn validate_contact(contact: &str) -> Result<String, ValidationError> {
    let trimmed = require(FieldName::Contact, contact)?;
    if count_digits(trimmed) < MIN_CONTACT_DIGITS {
        return Err(ValidationError::new(FieldName::Contact, Rule::Format));
    }
    Ok(trimmed.to_string())
}

/// Validates a calendar note title and returns it trimmed.
///
/// # Errors
/// Fails with `(title, required)`.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    require(FieldName::Title, title).map(str::to_string)
}

/// `true` for exactly two ASCII letters, in any case.
#[must_use]
pub fn is_wire_sign(value: &str) -> bool {
    value.chars().count() == WIRE_SIGN_LEN && value.chars().all(|c| c.is_ascii_alphabetic())
}

#[must_use]
pub fn count_digits(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

/// Registration form as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub wire_sign: String,
    pub password: String,
    pub confirm_password: String,
}

/// Normalized registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub wire_sign: String,
    pub password: String,
}

impl RegistrationForm {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.capture(validate_name(&self.name));
        let email = errors.capture(validate_email(&self.email));
        let contact = errors.capture(validate_contact(&self.contact));
        let wire_sign = errors.capture(validate_wire_sign(&self.wire_sign));
        let password = errors.capture(validate_password(&self.password));
        let confirmed = errors.capture(validate_confirm_password(
            &self.confirm_password,
            &self.password,
        ));

        let (Some(name), Some(email), Some(contact), Some(wire_sign), Some(()), Some(())) =
            (name, email, contact, wire_sign, password, confirmed)
        else {
            return Err(errors);
        };

        Ok(NewAccount {
            name,
            email,
            contact,
            wire_sign,
            password: self.password.clone(),
        })
    }
}

/// Editable part of the settings page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub name: String,
    pub wire_sign: String,
    pub contact: String,
    pub photo_url: String,
}

impl SettingsForm {
    /// # Errors
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.capture(validate_name(&self.name));
        let wire_sign = errors.capture(validate_wire_sign(&self.wire_sign));
        let contact = errors.capture(validate_contact(&self.contact));

        let (Some(name), Some(wire_sign), Some(contact)) = (name, wire_sign, contact) else {
            return Err(errors);
        };

        let photo_url = Some(self.photo_url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(ProfileUpdate {
            name,
            wire_sign,
            contact,
            photo_url,
        })
    }
}

/// Sign-in form. Only presence is checked; the provider judges the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    /// Returns `required` failures for empty fields.
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = errors.capture(require(FieldName::Email, &self.email).map(str::to_string));
        let password = errors.capture(require(FieldName::Password, &self.password));

        let (Some(email), Some(_)) = (email, password) else {
            return Err(errors);
        };

        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

/// Password reset request form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordResetForm {
    pub email: String,
}

impl PasswordResetForm {
    /// # Errors
    /// Returns `(email, required)` when empty.
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        require(FieldName::Email, &self.email)
            .map(str::to_string)
            .map_err(ValidationErrors::from)
    }
}
