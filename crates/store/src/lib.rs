//! `catalog-store` — document store boundary.
//!
//! The persistence engine is an external collaborator: this crate only defines
//! the collection contract the rest of the system talks to (filtered find,
//! insert, update-many, delete-many, delete-by-id) plus an in-memory
//! implementation for tests and dev wiring.

pub mod document;
pub mod memory;

pub use document::{Collection, Document, StoreError, StoreResult};
pub use memory::MemoryCollection;
