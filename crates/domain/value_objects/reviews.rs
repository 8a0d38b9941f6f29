use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::reviews::ReviewEntity;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
pub const MAX_COMMENT_LEN: usize = 1000;

/// Raised by the review store when the (property, user) unique key is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("review already exists for this property")]
pub struct DuplicateReview;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewModel {
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewDto {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub user_name: String,
    pub user_email: String,
    pub user_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewEntity> for ReviewDto {
    fn from(value: ReviewEntity) -> Self {
        Self {
            id: value.id,
            property_id: value.property_id,
            user_id: value.user_id,
            rating: value.rating,
            comment: value.comment,
            user_name: value.user_name,
            user_email: value.user_email,
            user_avatar: value.user_avatar,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewSummary {
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

impl ReviewSummary {
    pub fn from_ratings(ratings: impl IntoIterator<Item = i16>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0i64, 0usize), |(sum, count), rating| {
                (sum + i64::from(rating), count + 1)
            });

        let average_rating = (count > 0).then(|| {
            let average = sum as f64 / count as f64;
            (average * 10.0).round() / 10.0
        });

        Self {
            average_rating,
            review_count: count,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropertyReviewsDto {
    pub summary: ReviewSummary,
    pub reviews: Vec<ReviewDto>,
}
