//! Document store contract and query building for shelf.
//!
//! The rest of the workspace talks to persistence exclusively through the
//! [`Store`] trait: find/count/average over a [`Filter`], plus create,
//! update, and delete keyed by record id. [`query`] translates raw request
//! parameters into bounded store queries; [`memory::MemoryStore`] is the
//! in-process engine backing the binary and the test suites.

use async_trait::async_trait;
use serde_json::Value;
use uuid::{Timestamp, Uuid};

pub mod error;
pub mod filter;
pub mod memory;
pub mod query;
pub mod sort;

pub use error::{StoreError, StoreResult};
pub use filter::{Condition, Filter, Op};
pub use memory::MemoryStore;
pub use sort::{SortKey, SortSpec};

/// Declarative description of a collection a module owns.
///
/// `unique` lists compound indexes the engine must enforce atomically on
/// every write, independently of any application-level checks.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub unique: &'static [&'static [&'static str]],
}

/// Bounds and ordering for a find call.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: SortSpec,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// The persistence contract the application consumes.
///
/// Every record is a JSON object carrying a unique `id` field. Writes are
/// atomic per document; cross-document consistency is the caller's problem.
#[async_trait]
pub trait Store: Send + Sync {
    /// Register a collection and its unique indexes. Must be called before
    /// any other operation touches the collection.
    async fn register(&self, spec: CollectionSpec) -> StoreResult<()>;

    /// Insert a document, assigning an `id` if the caller did not set one.
    /// Returns the stored document. Fails with
    /// [`StoreError::UniqueViolation`] when a unique index would be broken.
    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<Value>;

    /// Fetch a single document by id.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Find all documents matching `filter`, bounded by `opts`.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        opts: FindOptions,
    ) -> StoreResult<Vec<Value>>;

    /// First document matching `filter`, in insertion order.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Value>>;

    /// Number of documents matching `filter`, unaffected by pagination.
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Arithmetic mean of a numeric field across every matching document.
    /// `None` when no document matches.
    async fn average(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
    ) -> StoreResult<Option<f64>>;

    /// Shallow-merge `patch` into the document with the given id. The `id`
    /// field itself is immutable. Returns the updated document, or `None`
    /// if the id does not resolve.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Option<Value>>;

    /// Delete one document by id. Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// Delete every document matching `filter`. Returns the removed count.
    async fn delete_where(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}

/// Generate a time-ordered record id.
pub fn new_record_id() -> String {
    Uuid::new_v7(Timestamp::now(uuid::NoContext)).to_string()
}
