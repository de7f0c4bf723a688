//! `catalog-domain` — the hierarchical lifecycle-consistency engine.
//!
//! Three collections with validated reference fields instead of enforced
//! foreign keys: `Category` owns `Subcategory` owns `Product`. Referential
//! integrity is enforced at write time by the [`hierarchy`] validator;
//! cascading deactivation and permanent deletion are sequenced by the
//! [`lifecycle`] engine (children before parents, no transactions).

pub mod category;
pub mod hierarchy;
pub mod lifecycle;
pub mod product;
pub mod subcategory;

pub use category::{Category, CategoryFilter, CategoryPatch};
pub use hierarchy::HierarchyValidator;
pub use lifecycle::{
    CategoryDeactivation, DeleteMode, LifecycleEngine, SubcategoryDeactivation,
};
pub use product::{Product, ProductFilter, ProductPatch};
pub use subcategory::{Subcategory, SubcategoryFilter, SubcategoryPatch};
