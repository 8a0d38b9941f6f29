use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

pub const MIN_MESSAGE_LEN: usize = 20;
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Raw form body; every field is optional so missing fields become validation errors
/// instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFormModel {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ValidContactForm {
    #[validate(length(max = 100, message = "Name is too long"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 200, message = "Subject is too long"))]
    pub subject: Option<String>,
    #[validate(length(min = 20, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("Message must be at least 20 characters long")]
    MessageTooShort,
    #[error("Message must be at most 5000 characters long")]
    MessageTooLong,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContactSubmittedDto {
    pub success: bool,
    pub message: String,
}

pub fn validate_contact_form(
    form: ContactFormModel,
) -> Result<ValidContactForm, ContactValidationError> {
    let name = required(form.name, "Name")?;
    let email = required(form.email, "Email")?;
    let message = required(form.message, "Message")?;
    let subject = form
        .subject
        .map(|subject| subject.trim().to_string())
        .filter(|subject| !subject.is_empty());

    let form = ValidContactForm {
        name,
        email,
        subject,
        message,
    };
    if let Err(errors) = form.validate() {
        return Err(rejection(&form, &errors));
    }

    Ok(ValidContactForm {
        email: form.email.to_ascii_lowercase(),
        ..form
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ContactValidationError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ContactValidationError::Missing(field))
}

/// Reports the first failing field, in form order, with its attribute message.
fn rejection(form: &ValidContactForm, errors: &ValidationErrors) -> ContactValidationError {
    let fields = errors.field_errors();
    for field in ["name", "subject", "email"] {
        let message = fields
            .get(field)
            .and_then(|field_errors| field_errors.first())
            .and_then(|error| error.message.as_ref());
        if let Some(message) = message {
            return ContactValidationError::Invalid(message.to_string());
        }
    }

    if form.message.chars().count() < MIN_MESSAGE_LEN {
        ContactValidationError::MessageTooShort
    } else {
        ContactValidationError::MessageTooLong
    }
}
