use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// These are **infrastructure errors** (availability, index enforcement), as
/// opposed to domain errors. The service layer translates them: a unique-index
/// violation becomes a duplicate-name/conflict error, anything else surfaces as
/// a storage failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique index rejected a write (e.g. two documents with the same name).
    #[error("unique index violation on '{index}': {value}")]
    UniqueViolation { index: &'static str, value: String },

    /// The store could not serve the request (connection loss, poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Translate store failures into the domain taxonomy.
///
/// A violation of a `name` index is a duplicate-name collision; violations of
/// identity indexes (`username`, `email`) are conflicts. This is how a
/// check-then-insert race still surfaces correctly: the explicit existence
/// check may pass, the store's own index is the backstop.
impl From<StoreError> for catalog_core::DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { index: "name", value } => {
                catalog_core::DomainError::DuplicateName(value)
            }
            StoreError::UniqueViolation { index, value } => {
                catalog_core::DomainError::conflict(format!("{index} already in use: {value}"))
            }
            StoreError::Unavailable(msg) => catalog_core::DomainError::Storage(msg),
        }
    }
}

/// A document stored in one named collection.
///
/// Each collection carries a typed filter (the analogue of a query document)
/// and a typed patch (the analogue of an `update_many` modifier). Keeping both
/// typed lets callers express cascade steps (`active=false` for every product
/// under a subcategory) without the store knowing anything about the hierarchy.
pub trait Document: Clone + Send + Sync + 'static {
    /// Typed filter over this collection.
    type Filter: Clone + Send + Sync;

    /// Typed partial update applied by [`Collection::update_many`].
    type Patch: Clone + Send + Sync;

    /// Opaque stable identifier assigned at creation.
    fn id(&self) -> Uuid;

    /// Whether this document satisfies the filter.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Apply the patch in place.
    ///
    /// Returns whether the document actually changed; `update_many` counts only
    /// changed documents (matched-but-unchanged documents do not count, which is
    /// what makes repeated soft deletes report zero newly-affected rows).
    fn apply(&mut self, patch: &Self::Patch) -> bool;

    /// Values of this document under the collection's unique indexes, as
    /// `(index name, value)` pairs. Implementations must normalize values the
    /// same way they are stored (e.g. lowercased emails).
    fn unique_keys(&self) -> Vec<(&'static str, String)>;
}

/// One named collection of documents.
///
/// Implementations must:
/// - enforce the collection's unique indexes on both insert and replace
/// - treat each call as an independent, per-document-atomic operation
///   (no cross-call transaction; callers sequence their own cascades)
pub trait Collection<T: Document>: Send + Sync {
    /// Insert a new document. Fails with [`StoreError::UniqueViolation`] if a
    /// unique index already holds one of the document's key values.
    fn insert(&self, doc: T) -> StoreResult<T>;

    /// All documents matching the filter, in unspecified order.
    fn find(&self, filter: &T::Filter) -> StoreResult<Vec<T>>;

    /// First document matching the filter, if any.
    fn find_one(&self, filter: &T::Filter) -> StoreResult<Option<T>>;

    /// Lookup by id.
    fn find_by_id(&self, id: Uuid) -> StoreResult<Option<T>>;

    /// Replace the stored document with the same id. Returns `None` if no such
    /// document exists. Unique indexes are re-checked against other documents.
    fn replace(&self, doc: T) -> StoreResult<Option<T>>;

    /// Apply the patch to every matching document; returns the number of
    /// documents that actually changed.
    fn update_many(&self, filter: &T::Filter, patch: &T::Patch) -> StoreResult<u64>;

    /// Delete every matching document; returns the number deleted.
    fn delete_many(&self, filter: &T::Filter) -> StoreResult<u64>;

    /// Delete by id, returning the removed document if it existed.
    fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<T>>;
}

impl<T, S> Collection<T> for Arc<S>
where
    T: Document,
    S: Collection<T> + ?Sized,
{
    fn insert(&self, doc: T) -> StoreResult<T> {
        (**self).insert(doc)
    }

    fn find(&self, filter: &T::Filter) -> StoreResult<Vec<T>> {
        (**self).find(filter)
    }

    fn find_one(&self, filter: &T::Filter) -> StoreResult<Option<T>> {
        (**self).find_one(filter)
    }

    fn find_by_id(&self, id: Uuid) -> StoreResult<Option<T>> {
        (**self).find_by_id(id)
    }

    fn replace(&self, doc: T) -> StoreResult<Option<T>> {
        (**self).replace(doc)
    }

    fn update_many(&self, filter: &T::Filter, patch: &T::Patch) -> StoreResult<u64> {
        (**self).update_many(filter, patch)
    }

    fn delete_many(&self, filter: &T::Filter) -> StoreResult<u64> {
        (**self).delete_many(filter)
    }

    fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<T>> {
        (**self).delete_by_id(id)
    }
}
