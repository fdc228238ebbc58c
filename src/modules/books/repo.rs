//! Book persistence operations: dynamic list queries, search, the review
//! aggregate for the detail view, and cascading deletion.

use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;

use shelf_http::error::AppError;
use shelf_http::extract::Principal;
use shelf_store::query::{self, PageParams, Pagination};
use shelf_store::{new_record_id, Condition, Filter, FindOptions, Store};

use crate::modules::reviews::models::Review;
use crate::modules::reviews::REVIEWS_COLLECTION;
use crate::utils;

use super::models::{Book, BookDetail, CreateBook, ReviewsBlock};
use super::BOOKS_COLLECTION;

/// Filter selecting every review of one book.
fn reviews_of(book_id: &str) -> Filter {
    Filter::new().and(Condition::eq("book_id", book_id.into()))
}

#[derive(Clone)]
pub struct BookRepo {
    store: Arc<dyn Store>,
}

impl BookRepo {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a book owned by the caller.
    pub async fn create(&self, principal: &Principal, req: CreateBook) -> Result<Book, AppError> {
        req.validate()?;

        let book = Book {
            id: new_record_id(),
            title: req.title,
            author: req.author,
            genre: req.genre,
            description: req.description,
            published_year: req.published_year,
            publisher: req.publisher,
            isbn: req.isbn,
            created_at: OffsetDateTime::now_utc(),
            owner_id: principal.id.clone(),
        };

        let doc = serde_json::to_value(&book).map_err(anyhow::Error::new)?;
        self.store.insert(BOOKS_COLLECTION, doc).await?;

        tracing::info!(book_id = %book.id, owner = %principal.id, "book created");
        Ok(book)
    }

    /// List books for arbitrary filter/sort/page parameters.
    ///
    /// The plan never fails: malformed pagination falls back to defaults
    /// and a filter on an unknown field simply matches nothing.
    pub async fn list(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<(Vec<Book>, Pagination), AppError> {
        let plan = query::plan(params);

        let docs = self
            .store
            .find(
                BOOKS_COLLECTION,
                &plan.filter,
                FindOptions {
                    sort: plan.sort,
                    skip: plan.page.skip(),
                    limit: Some(plan.page.limit),
                },
            )
            .await?;
        let total = self.store.count(BOOKS_COLLECTION, &plan.filter).await?;

        let books = docs
            .into_iter()
            .map(utils::decode)
            .collect::<Result<Vec<Book>, _>>()?;
        let pagination = Pagination::window(plan.page.page, plan.page.limit, total);
        Ok((books, pagination))
    }

    /// Case-insensitive substring search over title and author.
    pub async fn search(&self, needle: &str) -> Result<Vec<Book>, AppError> {
        let filter = query::search_filter(needle);
        let docs = self
            .store
            .find(BOOKS_COLLECTION, &filter, FindOptions::default())
            .await?;
        docs.into_iter().map(utils::decode).collect()
    }

    /// Detail view: the book plus its mean rating and a page of reviews.
    ///
    /// The mean is computed across every review of the book, not just the
    /// requested page; it is 0 when the book has no reviews.
    pub async fn detail(
        &self,
        id: &str,
        params: &HashMap<String, String>,
    ) -> Result<BookDetail, AppError> {
        let doc = self
            .store
            .get(BOOKS_COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("book not found with id of {id}")))?;
        let book: Book = utils::decode(doc)?;

        let page = PageParams::from_params(params);
        let filter = reviews_of(id);

        let review_docs = self
            .store
            .find(
                REVIEWS_COLLECTION,
                &filter,
                FindOptions {
                    skip: page.skip(),
                    limit: Some(page.limit),
                    ..FindOptions::default()
                },
            )
            .await?;
        let review_count = self.store.count(REVIEWS_COLLECTION, &filter).await?;
        let average_rating = self
            .store
            .average(REVIEWS_COLLECTION, &filter, "rating")
            .await?
            .unwrap_or(0.0);

        let reviews = review_docs
            .into_iter()
            .map(utils::decode)
            .collect::<Result<Vec<Review>, _>>()?;

        let reading_time_minutes = utils::reading_time_minutes(&book.description);
        Ok(BookDetail {
            average_rating,
            reading_time_minutes,
            reviews: ReviewsBlock {
                count: review_count,
                pagination: Pagination::window(page.page, page.limit, review_count),
                data: reviews,
            },
            book,
        })
    }

    /// Delete a book and, first, every review attached to it.
    ///
    /// This is the only deletion entry point for books; any future path
    /// must go through it so no review can outlive its book.
    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<(), AppError> {
        let doc = self
            .store
            .get(BOOKS_COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("book not found with id of {id}")))?;
        let book: Book = utils::decode(doc)?;

        if book.owner_id != principal.id {
            return Err(AppError::unauthorized(format!(
                "user {} is not authorized to delete this book",
                principal.id
            )));
        }

        let removed = self
            .store
            .delete_where(REVIEWS_COLLECTION, &reviews_of(id))
            .await?;
        self.store.delete(BOOKS_COLLECTION, id).await?;

        tracing::info!(book_id = %id, reviews_removed = removed, "book deleted");
        Ok(())
    }
}
