//! Axum handlers for review mutations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use shelf_http::error::AppError;
use shelf_http::extract::Principal;
use shelf_http::response::ItemBody;

use super::models::{CreateReview, Review, UpdateReview};
use super::repo::ReviewRepo;

/// POST /api/books/{id}/reviews: add the caller's review to a book.
pub async fn add_review(
    State(repo): State<ReviewRepo>,
    principal: Principal,
    Path(book_id): Path<String>,
    Json(req): Json<CreateReview>,
) -> Result<(StatusCode, Json<ItemBody<Review>>), AppError> {
    let review = repo.add(&principal, &book_id, req).await?;
    Ok((StatusCode::CREATED, Json(ItemBody::new(review))))
}

/// PUT /{id}: author-only partial update.
pub async fn update_review(
    State(repo): State<ReviewRepo>,
    principal: Principal,
    Path(id): Path<String>,
    Json(req): Json<UpdateReview>,
) -> Result<Json<ItemBody<Review>>, AppError> {
    let review = repo.update(&principal, &id, req).await?;
    Ok(Json(ItemBody::new(review)))
}

/// DELETE /{id}: author-only removal.
pub async fn delete_review(
    State(repo): State<ReviewRepo>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<ItemBody<serde_json::Value>>, AppError> {
    repo.delete(&principal, &id).await?;
    Ok(Json(ItemBody::new(json!({}))))
}
