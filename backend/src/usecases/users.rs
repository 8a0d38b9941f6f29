use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    entities::users::UpdateUserProfileEntity,
    repositories::users::UserRepository,
    value_objects::{
        enums::user_roles::UserRole,
        users::{SessionDto, UpdateProfileModel, UserDto},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::JwtKeys;

pub const MAX_FULL_NAME_LEN: usize = 100;
pub const MAX_AVATAR_URL_LEN: usize = 2048;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    InvalidProfile(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::InvalidProfile(_) => StatusCode::BAD_REQUEST,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UserError>;

pub struct UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    jwt_keys: Arc<JwtKeys>,
}

impl<U> UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, jwt_keys: Arc<JwtKeys>) -> Self {
        Self {
            user_repo,
            jwt_keys,
        }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> UseCaseResult<UserDto> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to load profile");
                UserError::Internal(err)
            })?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update_profile_model: UpdateProfileModel,
    ) -> UseCaseResult<UserDto> {
        let full_name = match update_profile_model.full_name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(UserError::InvalidProfile("full_name cannot be empty"));
                }
                if name.chars().count() > MAX_FULL_NAME_LEN {
                    return Err(UserError::InvalidProfile("full_name is too long"));
                }
                Some(name)
            }
            None => None,
        };

        let avatar_url = match update_profile_model.avatar_url {
            Some(url) => {
                let url = url.trim().to_string();
                if url.len() > MAX_AVATAR_URL_LEN
                    || !(url.starts_with("https://") || url.starts_with("http://"))
                {
                    return Err(UserError::InvalidProfile("avatar_url must be an http(s) URL"));
                }
                Some(url)
            }
            None => None,
        };

        if full_name.is_none() && avatar_url.is_none() {
            warn!(%user_id, "users: empty profile update");
            return Err(UserError::InvalidProfile("nothing to update"));
        }

        let user = self
            .user_repo
            .update_profile(
                user_id,
                UpdateUserProfileEntity {
                    full_name,
                    avatar_url,
                    updated_at: Some(Utc::now()),
                },
            )
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to update profile");
                UserError::Internal(err)
            })?;

        info!(%user_id, "users: profile updated");
        Ok(user.into())
    }

    /// Switches the active role and returns a fresh session carrying it.
    pub async fn switch_role(&self, user_id: Uuid, role: UserRole) -> UseCaseResult<SessionDto> {
        self.get_profile(user_id).await?;

        let user = self
            .user_repo
            .update_role(user_id, role)
            .await
            .map_err(|err| {
                error!(%user_id, role = %role, db_error = ?err, "users: failed to switch role");
                UserError::Internal(err)
            })?;

        info!(%user_id, role = %role, "users: role switched");

        let user = UserDto::from(user);
        let token = self.jwt_keys.issue(user.id, user.role, &user.email)?;
        Ok(SessionDto { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{entities::users::UserEntity, repositories::users::MockUserRepository};
    use mockall::predicate::eq;

    fn user(id: Uuid, role: UserRole) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id,
            full_name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            role: role.as_str().to_string(),
            avatar_url: None,
            auth_provider: "google".to_string(),
            provider_subject: Some("sub".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn keys() -> Arc<JwtKeys> {
        Arc::new(JwtKeys::new("users-test-secret", 1))
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let usecase = UserUseCase::new(Arc::new(user_repo), keys());
        let err = usecase.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn profile_update_trims_name() {
        let user_id = Uuid::new_v4();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_update_profile()
            .withf(move |id, entity| {
                *id == user_id
                    && entity.full_name.as_deref() == Some("Meera Nair")
                    && entity.avatar_url.is_none()
            })
            .times(1)
            .returning(move |_, _| Box::pin(async move { Ok(user(user_id, UserRole::Traveller)) }));

        let usecase = UserUseCase::new(Arc::new(user_repo), keys());
        usecase
            .update_profile(
                user_id,
                UpdateProfileModel {
                    full_name: Some("  Meera Nair ".to_string()),
                    avatar_url: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_and_invalid_updates_are_rejected() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_update_profile().never();
        let usecase = UserUseCase::new(Arc::new(user_repo), keys());

        let empty = usecase
            .update_profile(
                Uuid::new_v4(),
                UpdateProfileModel {
                    full_name: None,
                    avatar_url: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(empty.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let bad_avatar = usecase
            .update_profile(
                Uuid::new_v4(),
                UpdateProfileModel {
                    full_name: None,
                    avatar_url: Some("javascript:alert(1)".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(bad_avatar, UserError::InvalidProfile(_)));
    }

    #[tokio::test]
    async fn switch_role_issues_token_with_new_role() {
        let user_id = Uuid::new_v4();
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                Box::pin(async move { Ok(Some(user(user_id, UserRole::Traveller))) })
            });
        user_repo
            .expect_update_role()
            .with(eq(user_id), eq(UserRole::Owner))
            .returning(move |_, _| Box::pin(async move { Ok(user(user_id, UserRole::Owner)) }));

        let keys = keys();
        let usecase = UserUseCase::new(Arc::new(user_repo), Arc::clone(&keys));
        let session = usecase.switch_role(user_id, UserRole::Owner).await.unwrap();

        assert_eq!(session.user.role, UserRole::Owner);
        assert_eq!(keys.validate(&session.token).unwrap().role, UserRole::Owner);
    }
}
