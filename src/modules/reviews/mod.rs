pub mod handlers;
pub mod models;
pub mod repo;

use async_trait::async_trait;
use axum::routing::put;
use axum::Router;
use serde_json::json;

use shelf_kernel::{AppCtx, Module};
use shelf_store::CollectionSpec;

use handlers::{delete_review, update_review};
use repo::ReviewRepo;

/// Store collection holding review records.
pub const REVIEWS_COLLECTION: &str = "reviews";

/// Reviews module: author-gated update and delete. Creation is nested
/// under the book path and wired up by the books module.
pub struct ReviewsModule;

impl ReviewsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &AppCtx) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &AppCtx) -> Router {
        Router::new()
            .route("/{id}", put(update_review).delete(delete_review))
            .with_state(ReviewRepo::new(ctx.store.clone()))
    }

    fn collections(&self) -> Vec<CollectionSpec> {
        // The compound index is what holds "one review per user per book"
        // even when two requests race past the application-level check.
        vec![CollectionSpec {
            name: REVIEWS_COLLECTION,
            unique: &[&["book_id", "user_id"]],
        }]
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/{id}": {
                    "put": {
                        "summary": "Update own review",
                        "tags": ["Reviews"],
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
                        ],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/UpdateReview"}
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated review",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Review"}
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation error",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "401": {
                                "description": "Caller is not the author",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Review not found",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete own review",
                        "tags": ["Reviews"],
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {"description": "Review removed"},
                            "401": {
                                "description": "Caller is not the author",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Review not found",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "book_id": {"type": "string"},
                            "user_id": {"type": "string"},
                            "rating": {"type": "integer", "minimum": 1, "maximum": 5},
                            "comment": {"type": "string"},
                            "created_at": {"type": "string", "format": "date-time"}
                        },
                        "required": ["id", "book_id", "user_id", "rating", "created_at"]
                    },
                    "CreateReview": {
                        "type": "object",
                        "properties": {
                            "rating": {"type": "integer", "minimum": 1, "maximum": 5},
                            "comment": {"type": "string"}
                        },
                        "required": ["rating"]
                    },
                    "UpdateReview": {
                        "type": "object",
                        "properties": {
                            "rating": {"type": "integer", "minimum": 1, "maximum": 5},
                            "comment": {"type": "string"}
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &AppCtx) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module stopped");
        Ok(())
    }
}

/// Create a new instance of the reviews module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReviewsModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::test_ctx;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use shelf_http::extract::{Principal, DEFAULT_PRINCIPAL_HEADER};
    use tower::ServiceExt;

    use crate::modules::books::models::CreateBook;
    use crate::modules::books::repo::BookRepo;
    use super::models::CreateReview;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seeded_review(ctx: &shelf_kernel::AppCtx) -> String {
        let books = BookRepo::new(ctx.store.clone());
        let book = books
            .create(
                &Principal {
                    id: "owner".to_string(),
                },
                CreateBook {
                    title: "Dune".to_string(),
                    author: "Frank Herbert".to_string(),
                    genre: "science fiction".to_string(),
                    description: "Spice.".to_string(),
                    published_year: None,
                    publisher: None,
                    isbn: None,
                },
            )
            .await
            .unwrap();

        ReviewRepo::new(ctx.store.clone())
            .add(
                &Principal {
                    id: "author".to_string(),
                },
                &book.id,
                CreateReview {
                    rating: 3,
                    comment: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn author_updates_through_router() {
        let ctx = test_ctx().await;
        let review_id = seeded_review(&ctx).await;
        let router = ReviewsModule::new().routes(&ctx);

        let request = Request::put(format!("/{review_id}"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(DEFAULT_PRINCIPAL_HEADER, "author")
            .body(Body::from(serde_json::json!({"rating": 5}).to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["rating"], 5);
    }

    #[tokio::test]
    async fn stranger_is_rejected_with_401() {
        let ctx = test_ctx().await;
        let review_id = seeded_review(&ctx).await;
        let router = ReviewsModule::new().routes(&ctx);

        let request = Request::delete(format!("/{review_id}"))
            .header(DEFAULT_PRINCIPAL_HEADER, "someone-else")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn delete_returns_empty_data_envelope() {
        let ctx = test_ctx().await;
        let review_id = seeded_review(&ctx).await;
        let router = ReviewsModule::new().routes(&ctx);

        let request = Request::delete(format!("/{review_id}"))
            .header(DEFAULT_PRINCIPAL_HEADER, "author")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!({}));
    }
}
