use std::sync::Arc;

use crates::domain::{
    entities::contact_messages::InsertContactMessageEntity,
    repositories::contact_messages::ContactMessageRepository,
    value_objects::contact::{
        ContactFormModel, ContactSubmittedDto, ContactValidationError, validate_contact_form,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Invalid(#[from] ContactValidationError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ContactError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ContactError::Invalid(_) => StatusCode::BAD_REQUEST,
            ContactError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ContactError>;

pub struct ContactUseCase<C>
where
    C: ContactMessageRepository + Send + Sync + 'static,
{
    contact_repo: Arc<C>,
}

impl<C> ContactUseCase<C>
where
    C: ContactMessageRepository + Send + Sync + 'static,
{
    pub fn new(contact_repo: Arc<C>) -> Self {
        Self { contact_repo }
    }

    pub async fn submit(&self, form: ContactFormModel) -> UseCaseResult<ContactSubmittedDto> {
        let form = validate_contact_form(form).map_err(|err| {
            warn!(reason = %err, "contact: submission rejected");
            ContactError::Invalid(err)
        })?;

        let message_id = self
            .contact_repo
            .create(InsertContactMessageEntity {
                name: form.name,
                email: form.email.clone(),
                subject: form.subject,
                message: form.message,
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "contact: failed to store message");
                ContactError::Internal(err)
            })?;

        info!(%message_id, email = %form.email, "contact: message received");

        Ok(ContactSubmittedDto {
            success: true,
            message: "Thanks for reaching out. We will get back to you soon.".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::contact_messages::MockContactMessageRepository;
    use uuid::Uuid;

    fn form(message: &str) -> ContactFormModel {
        ContactFormModel {
            name: Some("Asha".to_string()),
            email: Some("Asha@Example.com".to_string()),
            subject: None,
            message: Some(message.to_string()),
        }
    }

    #[tokio::test]
    async fn stores_valid_submission() {
        let mut contact_repo = MockContactMessageRepository::new();
        contact_repo
            .expect_create()
            .withf(|entity| entity.email == "asha@example.com" && entity.subject.is_none())
            .times(1)
            .returning(|_| Box::pin(async move { Ok(Uuid::new_v4()) }));

        let usecase = ContactUseCase::new(Arc::new(contact_repo));
        let result = usecase
            .submit(form("I would like to list my beach house."))
            .await
            .unwrap();

        assert!(result.success);
    }

    #[tokio::test]
    async fn short_message_is_a_bad_request() {
        let mut contact_repo = MockContactMessageRepository::new();
        contact_repo.expect_create().never();

        let usecase = ContactUseCase::new(Arc::new(contact_repo));
        let err = usecase.submit(form("too short")).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Message must be at least 20 characters long");
    }

    #[tokio::test]
    async fn storage_failure_is_internal() {
        let mut contact_repo = MockContactMessageRepository::new();
        contact_repo
            .expect_create()
            .returning(|_| Box::pin(async move { Err(anyhow::anyhow!("db down")) }));

        let usecase = ContactUseCase::new(Arc::new(contact_repo));
        let err = usecase
            .submit(form("I would like to list my beach house."))
            .await
            .unwrap_err();

        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
