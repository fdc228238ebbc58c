use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::OffsetDateTime;

use shelf_http::error::AppError;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A user's review of one book. At most one exists per (book, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    /// 1 to 5 inclusive
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Request model for creating a review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CreateReview {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_rating(self.rating)
    }
}

/// Partial update applied to an existing review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl UpdateReview {
    pub fn validate(&self) -> Result<(), AppError> {
        match self.rating {
            Some(rating) => validate_rating(rating),
            None => Ok(()),
        }
    }

    /// Patch document containing only the provided fields.
    pub fn to_patch(&self) -> Value {
        let mut patch = json!({});
        if let Some(rating) = self.rating {
            patch["rating"] = json!(rating);
        }
        if let Some(comment) = &self.comment {
            patch["comment"] = json!(comment);
        }
        patch
    }
}

fn validate_rating(rating: i64) -> Result<(), AppError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "rating: must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        for rating in MIN_RATING..=MAX_RATING {
            assert!(CreateReview {
                rating,
                comment: None
            }
            .validate()
            .is_ok());
        }
        for rating in [0, 6, -1] {
            assert!(CreateReview {
                rating,
                comment: None
            }
            .validate()
            .is_err());
        }
    }

    #[test]
    fn update_patch_contains_only_given_fields() {
        let update = UpdateReview {
            rating: Some(4),
            comment: None,
        };
        assert_eq!(update.to_patch(), serde_json::json!({"rating": 4}));

        let empty = UpdateReview::default();
        assert_eq!(empty.to_patch(), serde_json::json!({}));
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateReview::default().validate().is_ok());
    }
}
