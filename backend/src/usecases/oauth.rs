use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::{
    domain::{
        entities::users::InsertUserEntity,
        repositories::users::UserRepository,
        value_objects::{
            enums::user_roles::UserRole,
            users::{OAuthProfile, SessionDto, UserDto},
        },
    },
    infra::google::oauth_client::GoogleOAuthClient,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::JwtKeys;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn authorization_url(&self, state: &str) -> AnyResult<String>;

    async fn exchange_code(&self, code: &str) -> AnyResult<OAuthProfile>;
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> AnyResult<String> {
        Ok(self.authorization_url(state)?.to_string())
    }

    async fn exchange_code(&self, code: &str) -> AnyResult<OAuthProfile> {
        self.exchange_code(code).await
    }
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("authorization code is required")]
    MissingCode,
    #[error("state must be owner or traveller")]
    InvalidState,
    #[error("sign-in with the provider failed")]
    ExchangeFailed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OAuthError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            OAuthError::MissingCode | OAuthError::InvalidState => StatusCode::BAD_REQUEST,
            OAuthError::ExchangeFailed => StatusCode::UNAUTHORIZED,
            OAuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, OAuthError>;

/// Role requested through the OAuth `state` parameter. Only applied to new users.
fn role_from_state(state: Option<&str>) -> UserRole {
    match state.map(str::trim) {
        Some(state) if state.eq_ignore_ascii_case("owner") => UserRole::Owner,
        _ => UserRole::Traveller,
    }
}

pub struct OAuthUseCase<U, P>
where
    U: UserRepository + Send + Sync + 'static,
    P: OAuthProvider + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    oauth_provider: Arc<P>,
    jwt_keys: Arc<JwtKeys>,
}

impl<U, P> OAuthUseCase<U, P>
where
    U: UserRepository + Send + Sync + 'static,
    P: OAuthProvider + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, oauth_provider: Arc<P>, jwt_keys: Arc<JwtKeys>) -> Self {
        Self {
            user_repo,
            oauth_provider,
            jwt_keys,
        }
    }

    pub fn authorization_url(&self, state: Option<&str>) -> UseCaseResult<String> {
        let state = match state.map(str::trim).filter(|s| !s.is_empty()) {
            None => UserRole::Traveller,
            Some(raw) => UserRole::from_str(raw).ok_or(OAuthError::InvalidState)?,
        };

        Ok(self.oauth_provider.authorization_url(state.as_str())?)
    }

    pub async fn handle_callback(
        &self,
        code: Option<String>,
        state: Option<String>,
    ) -> UseCaseResult<SessionDto> {
        let code = code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .ok_or(OAuthError::MissingCode)?;

        let profile = self
            .oauth_provider
            .exchange_code(&code)
            .await
            .map_err(|err| {
                warn!(provider_error = ?err, "oauth: code exchange failed");
                OAuthError::ExchangeFailed
            })?;

        let existing = self
            .user_repo
            .find_by_email(&profile.email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "oauth: failed to look up user");
                OAuthError::Internal(err)
            })?;

        let user = match existing {
            Some(user) => {
                if user.provider_subject.is_none() {
                    self.user_repo
                        .link_provider(user.id, &profile.provider, &profile.subject)
                        .await
                        .map_err(|err| {
                            error!(
                                user_id = %user.id,
                                db_error = ?err,
                                "oauth: failed to link provider"
                            );
                            OAuthError::Internal(err)
                        })?;
                }
                info!(user_id = %user.id, "oauth: existing user signed in");
                user
            }
            None => {
                let role = role_from_state(state.as_deref());
                let user = self
                    .user_repo
                    .create(InsertUserEntity {
                        full_name: profile.full_name,
                        email: profile.email,
                        role: role.as_str().to_string(),
                        avatar_url: profile.avatar_url,
                        auth_provider: profile.provider,
                        provider_subject: Some(profile.subject),
                    })
                    .await
                    .map_err(|err| {
                        error!(db_error = ?err, "oauth: failed to create user");
                        OAuthError::Internal(err)
                    })?;
                info!(user_id = %user.id, role = %role, "oauth: new user registered");
                user
            }
        };

        let user = UserDto::from(user);
        let token = self.jwt_keys.issue(user.id, user.role, &user.email)?;

        Ok(SessionDto { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{entities::users::UserEntity, repositories::users::MockUserRepository};
    use uuid::Uuid;

    fn profile() -> OAuthProfile {
        OAuthProfile {
            provider: "google".to_string(),
            subject: "google-sub-1".to_string(),
            email: "host@example.com".to_string(),
            full_name: "Host Person".to_string(),
            avatar_url: None,
        }
    }

    fn user(role: &str, provider_subject: Option<&str>) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: Uuid::new_v4(),
            full_name: "Host Person".to_string(),
            email: "host@example.com".to_string(),
            role: role.to_string(),
            avatar_url: None,
            auth_provider: "google".to_string(),
            provider_subject: provider_subject.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    fn keys() -> Arc<JwtKeys> {
        Arc::new(JwtKeys::new("oauth-test-secret", 1))
    }

    #[tokio::test]
    async fn owner_state_registers_new_owner() {
        let mut provider = MockOAuthProvider::new();
        provider
            .expect_exchange_code()
            .withf(|code| code == "auth-code")
            .returning(|_| Ok(profile()));

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(|_| Box::pin(async move { Ok(None) }));
        user_repo
            .expect_create()
            .withf(|entity| {
                entity.role == "owner" && entity.provider_subject.as_deref() == Some("google-sub-1")
            })
            .times(1)
            .returning(|_| Box::pin(async move { Ok(user("owner", Some("google-sub-1"))) }));

        let keys = keys();
        let usecase = OAuthUseCase::new(Arc::new(user_repo), Arc::new(provider), Arc::clone(&keys));
        let session = usecase
            .handle_callback(Some("auth-code".to_string()), Some("owner".to_string()))
            .await
            .unwrap();

        assert_eq!(session.user.role, UserRole::Owner);
        let auth = keys.validate(&session.token).unwrap();
        assert_eq!(auth.user_id, session.user.id);
    }

    #[tokio::test]
    async fn existing_user_keeps_role_and_gets_linked() {
        let mut provider = MockOAuthProvider::new();
        provider.expect_exchange_code().returning(|_| Ok(profile()));

        let existing = user("traveller", None);
        let existing_id = existing.id;
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_email().returning(move |_| {
            let existing = existing.clone();
            Box::pin(async move { Ok(Some(existing)) })
        });
        user_repo
            .expect_link_provider()
            .withf(move |id, provider, subject| {
                *id == existing_id && provider == "google" && subject == "google-sub-1"
            })
            .times(1)
            .returning(|_, _, _| Box::pin(async move { Ok(()) }));
        user_repo.expect_create().never();

        let usecase = OAuthUseCase::new(Arc::new(user_repo), Arc::new(provider), keys());
        let session = usecase
            .handle_callback(Some("auth-code".to_string()), Some("owner".to_string()))
            .await
            .unwrap();

        assert_eq!(session.user.role, UserRole::Traveller);
    }

    #[tokio::test]
    async fn missing_code_and_failed_exchange() {
        let mut provider = MockOAuthProvider::new();
        provider
            .expect_exchange_code()
            .returning(|_| Err(anyhow::anyhow!("invalid_grant")));
        let user_repo = MockUserRepository::new();

        let usecase = OAuthUseCase::new(Arc::new(user_repo), Arc::new(provider), keys());

        let missing = usecase.handle_callback(None, None).await.unwrap_err();
        assert!(matches!(missing, OAuthError::MissingCode));

        let failed = usecase
            .handle_callback(Some("stale".to_string()), None)
            .await
            .unwrap_err();
        assert_eq!(failed.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn authorization_url_validates_state() {
        let mut provider = MockOAuthProvider::new();
        provider
            .expect_authorization_url()
            .withf(|state| state == "owner")
            .returning(|_| Ok("https://accounts.example/auth?state=owner".to_string()));

        let usecase = OAuthUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(provider),
            keys(),
        );

        assert!(usecase.authorization_url(Some("owner")).is_ok());
        assert!(matches!(
            usecase.authorization_url(Some("admin")),
            Err(OAuthError::InvalidState)
        ));
    }
}
