//! Axum handlers for the books module. Thin: parameter plumbing and
//! envelope construction only, with the work done in [`super::repo`].

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use shelf_http::error::AppError;
use shelf_http::extract::Principal;
use shelf_http::response::{ItemBody, ListBody};

use super::models::{Book, BookDetail, CreateBook};
use super::repo::BookRepo;

/// GET /: list books with dynamic filter/sort/page parameters.
pub async fn list_books(
    State(repo): State<BookRepo>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListBody<Book>>, AppError> {
    let (books, pagination) = repo.list(&params).await?;
    Ok(Json(ListBody::paginated(books, pagination)))
}

/// GET /search: title/author substring search. `query` is required.
pub async fn search_books(
    State(repo): State<BookRepo>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListBody<Book>>, AppError> {
    let needle = params
        .get("query")
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::bad_request("please provide a search query"))?;

    let books = repo.search(needle).await?;
    Ok(Json(ListBody::unpaginated(books)))
}

/// GET /{id}: book detail with rating aggregate and paginated reviews.
pub async fn get_book(
    State(repo): State<BookRepo>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ItemBody<BookDetail>>, AppError> {
    let detail = repo.detail(&id, &params).await?;
    Ok(Json(ItemBody::new(detail)))
}

/// POST /: create a book owned by the caller.
pub async fn create_book(
    State(repo): State<BookRepo>,
    principal: Principal,
    Json(req): Json<CreateBook>,
) -> Result<(StatusCode, Json<ItemBody<Book>>), AppError> {
    let book = repo.create(&principal, req).await?;
    Ok((StatusCode::CREATED, Json(ItemBody::new(book))))
}

/// DELETE /{id}: owner-only; removes the book's reviews with it.
pub async fn delete_book(
    State(repo): State<BookRepo>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<ItemBody<serde_json::Value>>, AppError> {
    repo.delete(&principal, &id).await?;
    Ok(Json(ItemBody::new(json!({}))))
}
