use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::{
            properties::PropertyRepository, reviews::ReviewRepository, users::UserRepository,
        },
        value_objects::reviews::CreateReviewModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            properties::PropertyPostgres, reviews::ReviewPostgres, users::UserPostgres,
        },
    },
};
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::reviews::ReviewUseCase};

/// Mounted next to the property routes: `/{property_id}/reviews`.
pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let review_repository = ReviewPostgres::new(Arc::clone(&db_pool));
    let property_repository = PropertyPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let usecase = ReviewUseCase::new(
        Arc::new(review_repository),
        Arc::new(property_repository),
        Arc::new(user_repository),
    );

    Router::new()
        .route("/:property_id/reviews", get(list_reviews).post(create_review))
        .with_state(Arc::new(usecase))
}

pub async fn list_reviews<R, P, U>(
    State(usecase): State<Arc<ReviewUseCase<R, P, U>>>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let reviews = usecase
        .list_reviews(property_id)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok(Json(reviews))
}

pub async fn create_review<R, P, U>(
    State(usecase): State<Arc<ReviewUseCase<R, P, U>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
    Json(create_review_model): Json<CreateReviewModel>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let review = usecase
        .create_review(user_id, property_id, create_review_model)
        .await
        .map_err(|err| AppError::from_status(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(review)))
}
