use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::users::UserRepository,
        value_objects::users::{SwitchRoleModel, UpdateProfileModel},
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
};

use crate::{
    auth::{AuthUser, JwtKeys},
    axum_http::error_responses::AppError,
    usecases::users::UserUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, jwt_keys: Arc<JwtKeys>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let usecase = UserUseCase::new(Arc::new(user_repository), jwt_keys);

    Router::new()
        .route("/me", get(get_profile).patch(update_profile))
        .route("/me/role", post(switch_role))
        .with_state(Arc::new(usecase))
}

pub async fn get_profile<U>(
    State(usecase): State<Arc<UserUseCase<U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let user = usecase
        .get_profile(user_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(user))
}

pub async fn update_profile<U>(
    State(usecase): State<Arc<UserUseCase<U>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(update_profile_model): Json<UpdateProfileModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let user = usecase
        .update_profile(user_id, update_profile_model)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(user))
}

pub async fn switch_role<U>(
    State(usecase): State<Arc<UserUseCase<U>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(switch_role_model): Json<SwitchRoleModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let session = usecase
        .switch_role(user_id, switch_role_model.role)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(session))
}
