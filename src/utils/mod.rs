//! Project-specific utilities live here.

use serde::de::DeserializeOwned;
use serde_json::Value;

use shelf_http::error::AppError;

/// Reading pace used for the description reading-time estimate.
const WORDS_PER_MINUTE: u32 = 200;

/// Estimated minutes to read `text`, rounded up.
pub fn reading_time_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count() as u32;
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Deserialize a stored document into a domain type. A failure here means
/// the collection holds a document this build cannot represent, which is a
/// server fault rather than a client one.
pub fn decode<T: DeserializeOwned>(doc: Value) -> Result<T, AppError> {
    serde_json::from_value(doc).map_err(|err| AppError::Internal(anyhow::Error::new(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_time_rounds_up() {
        let four_hundred_words = "word ".repeat(400);
        assert_eq!(reading_time_minutes(&four_hundred_words), 2);

        let short = "just a few words";
        assert_eq!(reading_time_minutes(short), 1);
    }

    #[test]
    fn reading_time_of_empty_text_is_zero() {
        assert_eq!(reading_time_minutes(""), 0);
    }
}
