//! Success envelope types.
//!
//! Every successful response is `{success: true, ...}`; list payloads add
//! `count` (records in the current page) and, when the query was
//! paginated, the adjacent-page descriptor.

use serde::Serialize;

use shelf_store::query::Pagination;

/// Single-record response body
#[derive(Debug, Serialize)]
pub struct ItemBody<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ItemBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// List response body with optional pagination descriptor
#[derive(Debug, Serialize)]
pub struct ListBody<T: Serialize> {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: Vec<T>,
}

impl<T: Serialize> ListBody<T> {
    pub fn paginated(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination: Some(pagination),
            data,
        }
    }

    pub fn unpaginated(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination: None,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_body_serialization() {
        let body = ItemBody::new(json!({"id": "b1", "title": "Dune"}));

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["title"], "Dune");
    }

    #[test]
    fn paginated_list_serialization() {
        let body = ListBody::paginated(
            vec![json!({"id": 1}), json!({"id": 2})],
            Pagination::window(1, 2, 5),
        );

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 2);
        assert_eq!(value["pagination"]["next"]["page"], 2);
        assert!(value["pagination"].get("prev").is_none());
    }

    #[test]
    fn unpaginated_list_omits_descriptor() {
        let body = ListBody::unpaginated(vec![json!({"id": 1})]);

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["count"], 1);
        assert!(value.get("pagination").is_none());
    }
}
