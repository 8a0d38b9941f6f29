use std::sync::Arc;

use crates::domain::{
    entities::reviews::InsertReviewEntity,
    repositories::{
        properties::PropertyRepository, reviews::ReviewRepository, users::UserRepository,
    },
    value_objects::reviews::{
        CreateReviewModel, DuplicateReview, MAX_COMMENT_LEN, MAX_RATING, MIN_RATING,
        PropertyReviewsDto, ReviewDto, ReviewSummary,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("rating must be between 1 and 5")]
    InvalidRating,
    #[error("comment must be between 1 and 1000 characters")]
    InvalidComment,
    #[error("property not found")]
    PropertyNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("owners cannot review their own property")]
    OwnProperty,
    #[error("you have already reviewed this property")]
    AlreadyReviewed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReviewError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReviewError::InvalidRating | ReviewError::InvalidComment => StatusCode::BAD_REQUEST,
            ReviewError::PropertyNotFound | ReviewError::UserNotFound => StatusCode::NOT_FOUND,
            ReviewError::OwnProperty => StatusCode::FORBIDDEN,
            ReviewError::AlreadyReviewed => StatusCode::CONFLICT,
            ReviewError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ReviewError>;

pub struct ReviewUseCase<R, P, U>
where
    R: ReviewRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    review_repo: Arc<R>,
    property_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<R, P, U> ReviewUseCase<R, P, U>
where
    R: ReviewRepository + Send + Sync + 'static,
    P: PropertyRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(review_repo: Arc<R>, property_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            review_repo,
            property_repo,
            user_repo,
        }
    }

    pub async fn create_review(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        create_review_model: CreateReviewModel,
    ) -> UseCaseResult<ReviewDto> {
        if !(MIN_RATING..=MAX_RATING).contains(&create_review_model.rating) {
            return Err(ReviewError::InvalidRating);
        }
        let comment = create_review_model.comment.trim().to_string();
        let comment_len = comment.chars().count();
        if comment_len == 0 || comment_len > MAX_COMMENT_LEN {
            return Err(ReviewError::InvalidComment);
        }

        let property = self
            .property_repo
            .find_by_id(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "reviews: failed to load property");
                ReviewError::Internal(err)
            })?
            .ok_or(ReviewError::PropertyNotFound)?;

        if property.owner_id == user_id {
            warn!(%user_id, %property_id, "reviews: owner tried to review own property");
            return Err(ReviewError::OwnProperty);
        }

        let already_reviewed = self
            .review_repo
            .find_by_property_and_user(property_id, user_id)
            .await
            .map_err(|err| {
                error!(%user_id, %property_id, db_error = ?err, "reviews: duplicate check failed");
                ReviewError::Internal(err)
            })?
            .is_some();
        if already_reviewed {
            return Err(ReviewError::AlreadyReviewed);
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "reviews: failed to load reviewer");
                ReviewError::Internal(err)
            })?
            .ok_or(ReviewError::UserNotFound)?;

        let review = self
            .review_repo
            .create(InsertReviewEntity {
                property_id,
                user_id,
                rating: create_review_model.rating,
                comment,
                user_name: user.full_name,
                user_email: user.email,
                user_avatar: user.avatar_url,
            })
            .await
            .map_err(|err| {
                // Lost the race against a concurrent submit; the unique key decides.
                if err.downcast_ref::<DuplicateReview>().is_some() {
                    return ReviewError::AlreadyReviewed;
                }
                error!(%user_id, %property_id, db_error = ?err, "reviews: failed to store review");
                ReviewError::Internal(err)
            })?;

        info!(%user_id, %property_id, rating = review.rating, "reviews: review created");
        Ok(review.into())
    }

    pub async fn list_reviews(&self, property_id: Uuid) -> UseCaseResult<PropertyReviewsDto> {
        self.property_repo
            .find_by_id(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "reviews: failed to load property");
                ReviewError::Internal(err)
            })?
            .ok_or(ReviewError::PropertyNotFound)?;

        let reviews = self
            .review_repo
            .list_by_property(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "reviews: failed to list reviews");
                ReviewError::Internal(err)
            })?;

        let summary = ReviewSummary::from_ratings(reviews.iter().map(|review| review.rating));
        Ok(PropertyReviewsDto {
            summary,
            reviews: reviews.into_iter().map(ReviewDto::from).collect(),
        })
    }
}
