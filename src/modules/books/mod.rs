pub mod handlers;
pub mod models;
pub mod repo;

use async_trait::async_trait;
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;

use shelf_kernel::{AppCtx, Module};
use shelf_store::CollectionSpec;

use crate::modules::reviews;
use handlers::{create_book, delete_book, get_book, list_books, search_books};
use repo::BookRepo;

/// Store collection holding book records.
pub const BOOKS_COLLECTION: &str = "books";

/// Books module: list/search/detail/create/delete, plus the nested
/// review-creation route.
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &AppCtx) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &AppCtx) -> Router {
        let books = Router::new()
            .route("/", get(list_books).post(create_book))
            .route("/search", get(search_books))
            .route("/{id}", get(get_book).delete(delete_book))
            .with_state(BookRepo::new(ctx.store.clone()));

        // Review creation hangs off the book path but belongs to the
        // reviews module's repo.
        let nested_reviews = Router::new()
            .route("/{id}/reviews", post(reviews::handlers::add_review))
            .with_state(reviews::repo::ReviewRepo::new(ctx.store.clone()));

        books.merge(nested_reviews)
    }

    fn collections(&self) -> Vec<CollectionSpec> {
        vec![CollectionSpec {
            name: BOOKS_COLLECTION,
            unique: &[],
        }]
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "page", "in": "query", "schema": {"type": "integer", "minimum": 1}},
                            {"name": "limit", "in": "query", "schema": {"type": "integer", "minimum": 1}},
                            {"name": "sort", "in": "query", "schema": {"type": "string"}, "description": "Comma-separated fields; prefix - for descending"}
                        ],
                        "responses": {
                            "200": {
                                "description": "Paginated list of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "success": {"type": "boolean"},
                                                "count": {"type": "integer"},
                                                "pagination": {"type": "object"},
                                                "data": {
                                                    "type": "array",
                                                    "items": {"$ref": "#/components/schemas/Book"}
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/CreateBook"}
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Book created",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Book"}
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
                                "description": "Missing principal",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                },
                "/search": {
                    "get": {
                        "summary": "Search books by title or author",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "query", "in": "query", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "success": {"type": "boolean"},
                                                "count": {"type": "integer"},
                                                "data": {
                                                    "type": "array",
                                                    "items": {"$ref": "#/components/schemas/Book"}
                                                }
                                            }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing query parameter",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Book detail with average rating and reviews",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                            {"name": "page", "in": "query", "schema": {"type": "integer", "minimum": 1}},
                            {"name": "limit", "in": "query", "schema": {"type": "integer", "minimum": 1}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Book with review aggregate",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/BookDetail"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book and its reviews",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {"description": "Book and dependent reviews removed"},
                            "401": {
                                "description": "Caller does not own the book",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}/reviews": {
                    "post": {
                        "summary": "Add a review to a book",
                        "tags": ["Reviews"],
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
                        ],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/CreateReview"}
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Review created",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Review"}
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation error or duplicate review",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
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
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "title": {"type": "string", "maxLength": 100},
                            "author": {"type": "string"},
                            "genre": {"type": "string"},
                            "description": {"type": "string"},
                            "published_year": {"type": "integer"},
                            "publisher": {"type": "string"},
                            "isbn": {"type": "string"},
                            "created_at": {"type": "string", "format": "date-time"},
                            "owner_id": {"type": "string"}
                        },
                        "required": ["id", "title", "author", "genre", "description", "created_at", "owner_id"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string", "maxLength": 100},
                            "author": {"type": "string"},
                            "genre": {"type": "string"},
                            "description": {"type": "string"},
                            "published_year": {"type": "integer"},
                            "publisher": {"type": "string"},
                            "isbn": {"type": "string"}
                        },
                        "required": ["title", "author", "genre", "description"]
                    },
                    "BookDetail": {
                        "allOf": [
                            {"$ref": "#/components/schemas/Book"},
                            {
                                "type": "object",
                                "properties": {
                                    "average_rating": {"type": "number"},
                                    "reading_time_minutes": {"type": "integer"},
                                    "reviews": {
                                        "type": "object",
                                        "properties": {
                                            "count": {"type": "integer"},
                                            "pagination": {"type": "object"},
                                            "data": {
                                                "type": "array",
                                                "items": {"$ref": "#/components/schemas/Review"}
                                            }
                                        }
                                    }
                                }
                            }
                        ]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &AppCtx) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::test_ctx;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use shelf_http::extract::DEFAULT_PRINCIPAL_HEADER;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_request(with_principal: bool) -> Request<Body> {
        let payload = serde_json::json!({
            "title": "The Hobbit",
            "author": "J.R.R. Tolkien",
            "genre": "fantasy",
            "description": "There and back again."
        });
        let mut builder = Request::post("/").header(header::CONTENT_TYPE, "application/json");
        if with_principal {
            builder = builder.header(DEFAULT_PRINCIPAL_HEADER, "user-1");
        }
        builder.body(Body::from(payload.to_string())).unwrap()
    }

    #[tokio::test]
    async fn create_requires_principal() {
        let ctx = test_ctx().await;
        let router = BooksModule::new().routes(&ctx);

        let response = router.oneshot(create_request(false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn create_returns_created_envelope() {
        let ctx = test_ctx().await;
        let router = BooksModule::new().routes(&ctx);

        let response = router.oneshot(create_request(true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["title"], "The Hobbit");
        assert_eq!(body["data"]["owner_id"], "user-1");
    }

    #[tokio::test]
    async fn list_envelope_always_has_pagination() {
        let ctx = test_ctx().await;
        let router = BooksModule::new().routes(&ctx);

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 0);
        assert_eq!(body["pagination"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn search_without_query_is_bad_request() {
        let ctx = test_ctx().await;
        let router = BooksModule::new().routes(&ctx);

        let response = router
            .oneshot(Request::get("/search").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("search query"));
    }

    #[tokio::test]
    async fn missing_book_detail_is_not_found() {
        let ctx = test_ctx().await;
        let router = BooksModule::new().routes(&ctx);

        let response = router
            .oneshot(Request::get("/no-such-id").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn review_can_be_added_through_book_path() {
        let ctx = test_ctx().await;
        let router = BooksModule::new().routes(&ctx);

        let created = router
            .clone()
            .oneshot(create_request(true))
            .await
            .unwrap();
        let book_id = body_json(created).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let review = Request::post(format!("/{book_id}/reviews"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(DEFAULT_PRINCIPAL_HEADER, "reader-1")
            .body(Body::from(
                serde_json::json!({"rating": 5, "comment": "great"}).to_string(),
            ))
            .unwrap();

        let response = router.oneshot(review).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["data"]["book_id"], book_id);
        assert_eq!(body["data"]["user_id"], "reader-1");
    }
}
