use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::document::{Collection, Document, StoreError, StoreResult};

/// In-memory document collection.
///
/// Intended for tests/dev. Not optimized for performance. Each method holds the
/// collection lock for its own duration only, which matches the per-operation
/// atomicity the real store offers: a multi-step cascade interleaves with other
/// callers between steps.
#[derive(Debug)]
pub struct MemoryCollection<T> {
    docs: RwLock<HashMap<Uuid, T>>,
    offline: AtomicBool,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }
}

impl<T> MemoryCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while offline every operation fails with
    /// [`StoreError::Unavailable`]. Used to exercise partial-cascade behavior.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("collection offline"));
        }
        Ok(())
    }
}

impl<T: Document> MemoryCollection<T> {
    /// Check the document's unique keys against every other stored document.
    fn check_unique(docs: &HashMap<Uuid, T>, candidate: &T) -> StoreResult<()> {
        let keys = candidate.unique_keys();
        for existing in docs.values() {
            if existing.id() == candidate.id() {
                continue;
            }
            for (index, value) in &keys {
                if existing
                    .unique_keys()
                    .iter()
                    .any(|(i, v)| i == index && v == value)
                {
                    return Err(StoreError::UniqueViolation {
                        index,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<T: Document> Collection<T> for MemoryCollection<T> {
    fn insert(&self, doc: T) -> StoreResult<T> {
        self.ensure_online()?;
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        Self::check_unique(&docs, &doc)?;
        docs.insert(doc.id(), doc.clone());
        Ok(doc)
    }

    fn find(&self, filter: &T::Filter) -> StoreResult<Vec<T>> {
        self.ensure_online()?;
        let docs = self
            .docs
            .read()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        Ok(docs.values().filter(|d| d.matches(filter)).cloned().collect())
    }

    fn find_one(&self, filter: &T::Filter) -> StoreResult<Option<T>> {
        self.ensure_online()?;
        let docs = self
            .docs
            .read()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        Ok(docs.values().find(|d| d.matches(filter)).cloned())
    }

    fn find_by_id(&self, id: Uuid) -> StoreResult<Option<T>> {
        self.ensure_online()?;
        let docs = self
            .docs
            .read()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        Ok(docs.get(&id).cloned())
    }

    fn replace(&self, doc: T) -> StoreResult<Option<T>> {
        self.ensure_online()?;
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        if !docs.contains_key(&doc.id()) {
            return Ok(None);
        }
        Self::check_unique(&docs, &doc)?;
        docs.insert(doc.id(), doc.clone());
        Ok(Some(doc))
    }

    fn update_many(&self, filter: &T::Filter, patch: &T::Patch) -> StoreResult<u64> {
        self.ensure_online()?;
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        let mut modified = 0u64;
        for doc in docs.values_mut() {
            if doc.matches(filter) && doc.apply(patch) {
                modified += 1;
            }
        }
        Ok(modified)
    }

    fn delete_many(&self, filter: &T::Filter) -> StoreResult<u64> {
        self.ensure_online()?;
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        let before = docs.len();
        docs.retain(|_, d| !d.matches(filter));
        Ok((before - docs.len()) as u64)
    }

    fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<T>> {
        self.ensure_online()?;
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?;

        Ok(docs.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Uuid,
        title: String,
        pinned: bool,
    }

    #[derive(Debug, Clone, Default)]
    struct NoteFilter {
        pinned: Option<bool>,
    }

    #[derive(Debug, Clone)]
    enum NotePatch {
        Unpin,
    }

    impl Document for Note {
        type Filter = NoteFilter;
        type Patch = NotePatch;

        fn id(&self) -> Uuid {
            self.id
        }

        fn matches(&self, filter: &NoteFilter) -> bool {
            filter.pinned.is_none_or(|p| self.pinned == p)
        }

        fn apply(&mut self, patch: &NotePatch) -> bool {
            match patch {
                NotePatch::Unpin => {
                    let changed = self.pinned;
                    self.pinned = false;
                    changed
                }
            }
        }

        fn unique_keys(&self) -> Vec<(&'static str, String)> {
            vec![("title", self.title.clone())]
        }
    }

    fn note(title: &str, pinned: bool) -> Note {
        Note {
            id: Uuid::now_v7(),
            title: title.to_string(),
            pinned,
        }
    }

    #[test]
    fn insert_enforces_unique_index() {
        let coll = MemoryCollection::new();
        coll.insert(note("a", false)).unwrap();

        let err = coll.insert(note("a", true)).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { index: "title", .. }));
    }

    #[test]
    fn replace_enforces_unique_index_excluding_self() {
        let coll = MemoryCollection::new();
        let first = coll.insert(note("a", false)).unwrap();
        coll.insert(note("b", false)).unwrap();

        // Renaming onto an existing title is rejected.
        let mut renamed = first.clone();
        renamed.title = "b".to_string();
        assert!(coll.replace(renamed).is_err());

        // Re-saving under the same title is fine.
        let mut same = first;
        same.pinned = true;
        assert!(coll.replace(same).unwrap().is_some());
    }

    #[test]
    fn update_many_counts_only_changed_documents() {
        let coll = MemoryCollection::new();
        coll.insert(note("a", true)).unwrap();
        coll.insert(note("b", true)).unwrap();
        coll.insert(note("c", false)).unwrap();

        let filter = NoteFilter { pinned: None };
        assert_eq!(coll.update_many(&filter, &NotePatch::Unpin).unwrap(), 2);
        // Second pass matches everything but changes nothing.
        assert_eq!(coll.update_many(&filter, &NotePatch::Unpin).unwrap(), 0);
    }

    #[test]
    fn delete_many_by_filter() {
        let coll = MemoryCollection::new();
        coll.insert(note("a", true)).unwrap();
        coll.insert(note("b", false)).unwrap();

        let filter = NoteFilter { pinned: Some(true) };
        assert_eq!(coll.delete_many(&filter).unwrap(), 1);
        assert_eq!(coll.find(&NoteFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn offline_collection_fails_every_operation() {
        let coll = MemoryCollection::new();
        coll.insert(note("a", false)).unwrap();

        coll.set_offline(true);
        assert!(coll.find(&NoteFilter::default()).is_err());
        assert!(coll.insert(note("b", false)).is_err());

        coll.set_offline(false);
        assert!(coll.find(&NoteFilter::default()).is_ok());
    }
}
