//! Review persistence operations and the invariants around them: a review
//! attaches only to an existing book, a user reviews a book at most once,
//! and only the author may change or remove a review.

use std::sync::Arc;

use time::OffsetDateTime;

use shelf_http::error::AppError;
use shelf_http::extract::Principal;
use shelf_store::{new_record_id, Condition, Filter, Store, StoreError};

use crate::modules::books::BOOKS_COLLECTION;
use crate::utils;

use super::models::{CreateReview, Review, UpdateReview};
use super::REVIEWS_COLLECTION;

const DUPLICATE_MESSAGE: &str = "you have already reviewed this book";

#[derive(Clone)]
pub struct ReviewRepo {
    store: Arc<dyn Store>,
}

impl ReviewRepo {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Attach a new review to a book.
    ///
    /// The existence lookup gives a friendly error before the write, but
    /// the store's unique index on (book_id, user_id) is what actually
    /// holds the one-review invariant: two racing requests cannot both get
    /// past it, so a violation from the insert maps to the same duplicate
    /// error the fast path produces.
    pub async fn add(
        &self,
        principal: &Principal,
        book_id: &str,
        req: CreateReview,
    ) -> Result<Review, AppError> {
        req.validate()?;

        if self.store.get(BOOKS_COLLECTION, book_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "no book found with the id of {book_id}"
            )));
        }

        let existing = Filter::new()
            .and(Condition::eq("book_id", book_id.into()))
            .and(Condition::eq("user_id", principal.id.as_str().into()));
        if self
            .store
            .find_one(REVIEWS_COLLECTION, &existing)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate(DUPLICATE_MESSAGE));
        }

        let review = Review {
            id: new_record_id(),
            book_id: book_id.to_string(),
            user_id: principal.id.clone(),
            rating: req.rating,
            comment: req.comment,
            created_at: OffsetDateTime::now_utc(),
        };

        let doc = serde_json::to_value(&review).map_err(anyhow::Error::new)?;
        match self.store.insert(REVIEWS_COLLECTION, doc).await {
            Ok(_) => {
                tracing::info!(review_id = %review.id, book_id = %book_id, "review created");
                Ok(review)
            }
            Err(StoreError::UniqueViolation { .. }) => Err(AppError::duplicate(DUPLICATE_MESSAGE)),
            Err(err) => Err(err.into()),
        }
    }

    /// Apply a partial update to the caller's own review.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        req: UpdateReview,
    ) -> Result<Review, AppError> {
        req.validate()?;
        let review = self.load_owned(principal, id, "update").await?;

        let updated = self
            .store
            .update(REVIEWS_COLLECTION, &review.id, req.to_patch())
            .await?
            .ok_or_else(|| AppError::not_found(format!("no review found with the id of {id}")))?;

        utils::decode(updated)
    }

    /// Delete the caller's own review.
    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<(), AppError> {
        let review = self.load_owned(principal, id, "delete").await?;
        self.store.delete(REVIEWS_COLLECTION, &review.id).await?;

        tracing::info!(review_id = %id, "review deleted");
        Ok(())
    }

    /// Load a review and verify the caller authored it. Runs before any
    /// mutation, so a failed check leaves the record untouched.
    async fn load_owned(
        &self,
        principal: &Principal,
        id: &str,
        action: &str,
    ) -> Result<Review, AppError> {
        let doc = self
            .store
            .get(REVIEWS_COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("no review found with the id of {id}")))?;
        let review: Review = utils::decode(doc)?;

        if review.user_id != principal.id {
            return Err(AppError::unauthorized(format!(
                "user {} is not authorized to {action} this review",
                principal.id
            )));
        }
        Ok(review)
    }
}
