//! Lifecycle engine: cascading deactivation and permanent deletion.
//!
//! `active` is a two-state flag; hard-deleted entities are not a state — they
//! are removed from the store and become unaddressable. Cascades are an
//! explicit ordered sequence of independent store operations (children before
//! parents) with no wrapping transaction: a step failure surfaces as a storage
//! error and leaves earlier steps committed. Every operation fetches its
//! target first and fails `NotFound` before any cascade step runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{CategoryId, DomainError, DomainResult, ProductId, SubcategoryId};
use catalog_store::Collection;

use crate::{
    Category, Product, ProductFilter, ProductPatch, Subcategory, SubcategoryFilter,
    SubcategoryPatch,
};

/// Soft vs hard deletion, chosen by the caller per request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Reversible: mark `active=false`, cascading to children.
    #[default]
    Soft,
    /// Irreversible: remove the entity and cascaded children from the store.
    Hard,
}

impl DeleteMode {
    /// From the boundary's `hardDelete` flag (absent means soft).
    pub fn from_hard_flag(hard_delete: bool) -> Self {
        if hard_delete { DeleteMode::Hard } else { DeleteMode::Soft }
    }
}

/// Outcome of a category soft delete, with per-step affected counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDeactivation {
    pub category: Category,
    pub subcategories_affected: u64,
    pub products_affected: u64,
}

/// Outcome of a subcategory soft delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryDeactivation {
    pub subcategory: Subcategory,
    pub products_affected: u64,
}

/// Orchestrates create-free lifecycle transitions (deactivate, reactivate,
/// remove) across the three collections.
#[derive(Debug)]
pub struct LifecycleEngine<C, S, P> {
    categories: C,
    subcategories: S,
    products: P,
}

impl<C, S, P> LifecycleEngine<C, S, P>
where
    C: Collection<Category>,
    S: Collection<Subcategory>,
    P: Collection<Product>,
{
    pub fn new(categories: C, subcategories: S, products: P) -> Self {
        Self {
            categories,
            subcategories,
            products,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Target fetches (NotFound before any cascade step)
    // ─────────────────────────────────────────────────────────────────────────

    fn fetch_category(&self, id: CategoryId) -> DomainResult<Category> {
        self.categories
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("category"))
    }

    fn fetch_subcategory(&self, id: SubcategoryId) -> DomainResult<Subcategory> {
        self.subcategories
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("subcategory"))
    }

    fn fetch_product(&self, id: ProductId) -> DomainResult<Product> {
        self.products
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("product"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Category
    // ─────────────────────────────────────────────────────────────────────────

    /// Deactivate a category and everything under it.
    ///
    /// Children are matched by their own references: subcategories by
    /// `category == id`, products directly by `category == id` (not re-derived
    /// through subcategory membership). Idempotent — on an already-inactive
    /// tree the same filters re-apply and the counts come back zero.
    pub fn soft_delete_category(
        &self,
        id: CategoryId,
        now: DateTime<Utc>,
    ) -> DomainResult<CategoryDeactivation> {
        let mut category = self.fetch_category(id)?;
        category.set_active(false, now);
        let category = self
            .categories
            .replace(category)?
            .ok_or_else(|| DomainError::not_found("category"))?;

        let subcategories_affected = self
            .subcategories
            .update_many(&SubcategoryFilter::under(id), &SubcategoryPatch::Deactivate { at: now })?;

        let products_affected = self
            .products
            .update_many(&ProductFilter::by_category(id), &ProductPatch::Deactivate { at: now })?;

        tracing::info!(
            category = %id,
            subcategories = subcategories_affected,
            products = products_affected,
            "category deactivated"
        );

        Ok(CategoryDeactivation {
            category,
            subcategories_affected,
            products_affected,
        })
    }

    /// Permanently remove a category and everything under it.
    ///
    /// Order is mandatory — children before parents — so no orphaned reference
    /// becomes visible during the multi-step window:
    /// 1. products matched by `category == id`
    /// 2. products matched by `subcategory ∈ children(id)` (sweeps products
    ///    whose own category reference went stale or crossed branches)
    /// 3. subcategories matched by `category == id`
    /// 4. the category itself
    pub fn hard_delete_category(&self, id: CategoryId) -> DomainResult<Category> {
        let category = self.fetch_category(id)?;

        let subcategory_ids: Vec<SubcategoryId> = self
            .subcategories
            .find(&SubcategoryFilter::under(id))?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let mut products_removed = self
            .products
            .delete_many(&ProductFilter::by_category(id))?;
        products_removed += self
            .products
            .delete_many(&ProductFilter::by_subcategories(subcategory_ids))?;

        let subcategories_removed = self
            .subcategories
            .delete_many(&SubcategoryFilter::under(id))?;

        self.categories.delete_by_id(id.into())?;

        tracing::info!(
            category = %id,
            subcategories = subcategories_removed,
            products = products_removed,
            "category hard-deleted"
        );

        Ok(category)
    }

    /// Reactivate a category. Does not cascade: children keep whatever
    /// `active` state they have.
    pub fn reactivate_category(
        &self,
        id: CategoryId,
        now: DateTime<Utc>,
    ) -> DomainResult<Category> {
        let mut category = self.fetch_category(id)?;
        category.set_active(true, now);
        self.categories
            .replace(category)?
            .ok_or_else(|| DomainError::not_found("category"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Subcategory
    // ─────────────────────────────────────────────────────────────────────────

    /// Deactivate a subcategory and the products under it.
    pub fn soft_delete_subcategory(
        &self,
        id: SubcategoryId,
        now: DateTime<Utc>,
    ) -> DomainResult<SubcategoryDeactivation> {
        let mut subcategory = self.fetch_subcategory(id)?;
        subcategory.set_active(false, now);
        let subcategory = self
            .subcategories
            .replace(subcategory)?
            .ok_or_else(|| DomainError::not_found("subcategory"))?;

        let products_affected = self
            .products
            .update_many(&ProductFilter::by_subcategory(id), &ProductPatch::Deactivate { at: now })?;

        tracing::info!(
            subcategory = %id,
            products = products_affected,
            "subcategory deactivated"
        );

        Ok(SubcategoryDeactivation {
            subcategory,
            products_affected,
        })
    }

    /// Permanently remove a subcategory: its products first, then the
    /// subcategory itself.
    pub fn hard_delete_subcategory(&self, id: SubcategoryId) -> DomainResult<Subcategory> {
        let subcategory = self.fetch_subcategory(id)?;

        let products_removed = self
            .products
            .delete_many(&ProductFilter::by_subcategory(id))?;
        self.subcategories.delete_by_id(id.into())?;

        tracing::info!(
            subcategory = %id,
            products = products_removed,
            "subcategory hard-deleted"
        );

        Ok(subcategory)
    }

    /// Reactivate a subcategory without touching its products.
    pub fn reactivate_subcategory(
        &self,
        id: SubcategoryId,
        now: DateTime<Utc>,
    ) -> DomainResult<Subcategory> {
        let mut subcategory = self.fetch_subcategory(id)?;
        subcategory.set_active(true, now);
        self.subcategories
            .replace(subcategory)?
            .ok_or_else(|| DomainError::not_found("subcategory"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Product (leaf: no cascade)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn soft_delete_product(
        &self,
        id: ProductId,
        now: DateTime<Utc>,
    ) -> DomainResult<Product> {
        let mut product = self.fetch_product(id)?;
        product.set_active(false, now);
        self.products
            .replace(product)?
            .ok_or_else(|| DomainError::not_found("product"))
    }

    pub fn hard_delete_product(&self, id: ProductId) -> DomainResult<Product> {
        let product = self.fetch_product(id)?;
        self.products.delete_by_id(id.into())?;
        Ok(product)
    }

    pub fn reactivate_product(
        &self,
        id: ProductId,
        now: DateTime<Utc>,
    ) -> DomainResult<Product> {
        let mut product = self.fetch_product(id)?;
        product.set_active(true, now);
        self.products
            .replace(product)?
            .ok_or_else(|| DomainError::not_found("product"))
    }
}
