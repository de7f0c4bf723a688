//! Catalog service wiring.

use catalog_auth::User;
use catalog_domain::{Category, HierarchyValidator, LifecycleEngine, Product, Subcategory};
use catalog_store::Collection;

/// Composition of the catalog components over one set of collections.
///
/// Generic over the collection handles so tests wire in-memory collections and
/// production wires the real store; handles are cheap clones (typically
/// `Arc<_>`), shared between the service, the validator, and the engine.
#[derive(Debug)]
pub struct CatalogService<C, S, P, U> {
    pub(crate) categories: C,
    pub(crate) subcategories: S,
    pub(crate) products: P,
    pub(crate) users: U,
    pub(crate) validator: HierarchyValidator<C, S>,
    pub(crate) engine: LifecycleEngine<C, S, P>,
}

impl<C, S, P, U> CatalogService<C, S, P, U>
where
    C: Collection<Category> + Clone,
    S: Collection<Subcategory> + Clone,
    P: Collection<Product> + Clone,
    U: Collection<User>,
{
    pub fn new(categories: C, subcategories: S, products: P, users: U) -> Self {
        let validator = HierarchyValidator::new(categories.clone(), subcategories.clone());
        let engine = LifecycleEngine::new(
            categories.clone(),
            subcategories.clone(),
            products.clone(),
        );
        Self {
            categories,
            subcategories,
            products,
            users,
            validator,
            engine,
        }
    }
}

/// Newest-first ordering used by every list operation.
pub(crate) fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}
