use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use shelf_http::error::AppError;
use shelf_store::query::Pagination;

use crate::modules::reviews::models::Review;

/// Longest accepted title.
pub const MAX_TITLE_LEN: usize = 100;

/// A book record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// User that created the record
    pub owner_id: String,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
}

impl CreateBook {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push("title: please add a title");
        } else if self.title.len() > MAX_TITLE_LEN {
            problems.push("title: cannot be more than 100 characters");
        }
        if self.author.trim().is_empty() {
            problems.push("author: please add an author");
        }
        if self.genre.trim().is_empty() {
            problems.push("genre: please add a genre");
        }
        if self.description.trim().is_empty() {
            problems.push("description: please add a description");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(problems.join(", ")))
        }
    }
}

/// Book detail payload: the record plus its review aggregate.
#[derive(Debug, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub average_rating: f64,
    pub reading_time_minutes: u32,
    pub reviews: ReviewsBlock,
}

/// Paginated review sub-list on the detail payload.
#[derive(Debug, Serialize)]
pub struct ReviewsBlock {
    pub count: u64,
    pub pagination: Pagination,
    pub data: Vec<Review>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateBook {
        CreateBook {
            title: "The Hobbit".to_string(),
            author: "J.R.R. Tolkien".to_string(),
            genre: "fantasy".to_string(),
            description: "There and back again.".to_string(),
            published_year: Some(1937),
            publisher: None,
            isbn: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut req = valid();
        req.title = "  ".to_string();
        req.genre = String::new();

        let err = req.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("title"));
        assert!(message.contains("genre"));
    }

    #[test]
    fn overlong_title_is_rejected() {
        let mut req = valid();
        req.title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let req: CreateBook = serde_json::from_value(serde_json::json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "science fiction",
            "description": "Spice."
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.published_year, None);
    }
}
