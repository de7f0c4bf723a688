//! Hierarchy validator: parent-existence and parent-child consistency.
//!
//! The store enforces no foreign keys, so every write that introduces or moves
//! a reference goes through here first. The product check uses a single
//! constrained lookup (subcategory id *and* category id in one filter), which
//! makes "exists but on another branch" indistinguishable from "absent" —
//! both fail the same way, and the no-cross-branch invariant holds by
//! construction.

use catalog_core::{CategoryId, DomainError, DomainResult, SubcategoryId};
use catalog_store::Collection;

use crate::{Category, Subcategory, SubcategoryFilter};

/// Write-time referential validation over the category/subcategory
/// collections.
#[derive(Debug)]
pub struct HierarchyValidator<C, S> {
    categories: C,
    subcategories: S,
}

impl<C, S> HierarchyValidator<C, S>
where
    C: Collection<Category>,
    S: Collection<Subcategory>,
{
    pub fn new(categories: C, subcategories: S) -> Self {
        Self {
            categories,
            subcategories,
        }
    }

    /// Resolve the parent category for a subcategory write.
    pub fn validate_subcategory_parent(&self, category: CategoryId) -> DomainResult<Category> {
        self.categories
            .find_by_id(category.into())?
            .ok_or_else(|| DomainError::not_found("category"))
    }

    /// Resolve both parents for a product write.
    ///
    /// Fails `NotFound("category")` if the category is absent, then
    /// `NotFound("subcategory")` if the subcategory is absent *or* belongs to
    /// a different category.
    pub fn validate_product_parents(
        &self,
        category: CategoryId,
        subcategory: SubcategoryId,
    ) -> DomainResult<(Category, Subcategory)> {
        let parent = self.validate_subcategory_parent(category)?;

        let sub = self
            .subcategories
            .find_one(&SubcategoryFilter::id_under(subcategory, category))?
            .ok_or_else(|| DomainError::not_found("subcategory"))?;

        Ok((parent, sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;

    use catalog_store::MemoryCollection;

    fn setup() -> (
        Arc<MemoryCollection<Category>>,
        Arc<MemoryCollection<Subcategory>>,
        HierarchyValidator<Arc<MemoryCollection<Category>>, Arc<MemoryCollection<Subcategory>>>,
    ) {
        let categories = Arc::new(MemoryCollection::new());
        let subcategories = Arc::new(MemoryCollection::new());
        let validator = HierarchyValidator::new(categories.clone(), subcategories.clone());
        (categories, subcategories, validator)
    }

    #[test]
    fn subcategory_parent_must_exist() {
        let (categories, _, validator) = setup();

        let missing = validator.validate_subcategory_parent(CategoryId::new());
        assert_eq!(missing.unwrap_err(), DomainError::not_found("category"));

        let tools = categories
            .insert(Category::create("Tools", "", Utc::now()).unwrap())
            .unwrap();
        let found = validator.validate_subcategory_parent(tools.id).unwrap();
        assert_eq!(found.name, "Tools");
    }

    #[test]
    fn product_parents_must_be_consistent() {
        let (categories, subcategories, validator) = setup();

        let electronics = categories
            .insert(Category::create("Electronics", "", Utc::now()).unwrap())
            .unwrap();
        let clothing = categories
            .insert(Category::create("Clothing", "", Utc::now()).unwrap())
            .unwrap();
        let phones = subcategories
            .insert(Subcategory::create("Phones", "", electronics.id, Utc::now()).unwrap())
            .unwrap();

        // Consistent pair resolves both parents.
        let (cat, sub) = validator
            .validate_product_parents(electronics.id, phones.id)
            .unwrap();
        assert_eq!(cat.id, electronics.id);
        assert_eq!(sub.id, phones.id);

        // Cross-branch pair: subcategory exists, but under another category.
        let err = validator
            .validate_product_parents(clothing.id, phones.id)
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("subcategory"));

        // Absent category is reported before the subcategory is consulted.
        let err = validator
            .validate_product_parents(CategoryId::new(), phones.id)
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("category"));
    }

    #[test]
    fn store_outage_surfaces_as_storage_error() {
        let (categories, _, validator) = setup();
        categories.set_offline(true);

        let err = validator.validate_subcategory_parent(CategoryId::new()).unwrap_err();
        assert_eq!(err.code(), "storage_error");
    }
}
