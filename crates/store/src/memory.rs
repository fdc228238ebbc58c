//! In-memory store engine.
//!
//! Collections live in a single map behind an async RwLock, so every write
//! path (including unique-index checks) runs atomically with respect to
//! other writers. Good enough for the binary and the test suites; not a
//! durability layer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::{new_record_id, CollectionSpec, FindOptions, Store};

#[derive(Default)]
struct Collection {
    unique: Vec<Vec<String>>,
    docs: Vec<Value>,
}

/// [`Store`] implementation backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Tuple of the indexed field values for a document. `None` when any field
/// is absent or null; such documents are not indexed.
fn unique_key(doc: &Value, fields: &[String]) -> Option<Vec<Value>> {
    fields
        .iter()
        .map(|f| doc.get(f).filter(|v| !v.is_null()).cloned())
        .collect()
}

fn check_unique(
    collection: &str,
    col: &Collection,
    doc: &Value,
    skip_idx: Option<usize>,
) -> StoreResult<()> {
    for index in &col.unique {
        let Some(key) = unique_key(doc, index) else {
            continue;
        };
        let taken = col
            .docs
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip_idx)
            .any(|(_, d)| unique_key(d, index).as_ref() == Some(&key));
        if taken {
            return Err(StoreError::UniqueViolation {
                collection: collection.to_string(),
                index: index.join("+"),
            });
        }
    }
    Ok(())
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

#[async_trait]
impl Store for MemoryStore {
    async fn register(&self, spec: CollectionSpec) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let col = collections.entry(spec.name.to_string()).or_default();
        col.unique = spec
            .unique
            .iter()
            .map(|index| index.iter().map(|f| f.to_string()).collect())
            .collect();
        tracing::debug!(collection = spec.name, indexes = col.unique.len(), "collection registered");
        Ok(())
    }

    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<Value> {
        let mut collections = self.collections.write().await;
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let Value::Object(mut obj) = doc else {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        };
        obj.entry("id")
            .or_insert_with(|| Value::String(new_record_id()));
        let doc = Value::Object(obj);

        check_unique(collection, col, &doc, None)?;
        col.docs.push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(col.docs.iter().find(|d| doc_id(d) == Some(id)).cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        opts: FindOptions,
    ) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let mut matched: Vec<Value> = col
            .docs
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        if !opts.sort.is_empty() {
            matched.sort_by(|a, b| opts.sort.compare(a, b));
        }

        let window = matched.into_iter().skip(opts.skip as usize);
        Ok(match opts.limit {
            Some(limit) => window.take(limit as usize).collect(),
            None => window.collect(),
        })
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(col.docs.iter().find(|d| filter.matches(d)).cloned())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(col.docs.iter().filter(|d| filter.matches(d)).count() as u64)
    }

    async fn average(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
    ) -> StoreResult<Option<f64>> {
        let collections = self.collections.read().await;
        let col = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let values: Vec<f64> = col
            .docs
            .iter()
            .filter(|d| filter.matches(d))
            .filter_map(|d| d.get(field).and_then(Value::as_f64))
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Option<Value>> {
        let mut collections = self.collections.write().await;
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidDocument(
                "patch must be a JSON object".to_string(),
            ));
        };
        let Some(pos) = col.docs.iter().position(|d| doc_id(d) == Some(id)) else {
            return Ok(None);
        };

        let mut updated = col.docs[pos].clone();
        if let Value::Object(target) = &mut updated {
            for (key, value) in patch {
                if key == "id" {
                    continue;
                }
                target.insert(key, value);
            }
        }
        check_unique(collection, col, &updated, Some(pos))?;
        col.docs[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let before = col.docs.len();
        col.docs.retain(|d| doc_id(d) != Some(id));
        Ok(col.docs.len() < before)
    }

    async fn delete_where(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let before = col.docs.len();
        col.docs.retain(|d| !filter.matches(d));
        Ok((before - col.docs.len()) as u64)
    }
}
