//! Subcategory operations.
//!
//! Reads return [`SubcategoryView`]s with the parent category reference
//! resolved to its name, the shape the boundary serializes directly.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use catalog_auth::{Actor, CatalogAction, User, authorize_catalog};
use catalog_core::{CategoryId, DomainError, DomainResult, SubcategoryId, Timestamps};
use catalog_domain::{
    Category, CategoryFilter, DeleteMode, Product, Subcategory, SubcategoryDeactivation,
    SubcategoryFilter,
};
use catalog_store::Collection;

use crate::product::RefView;
use crate::service::{CatalogService, newest_first};

/// Create payload. `category` must reference an existing category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubcategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: CategoryId,
}

/// Partial update: only supplied fields change. A supplied `category`
/// re-validates the parent before the move.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubcategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
}

/// A subcategory with its parent reference resolved for display. The parent
/// is `None` only if the referenced category has since been removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryView {
    pub id: SubcategoryId,
    pub name: String,
    pub description: String,
    pub category: Option<RefView>,
    pub active: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl SubcategoryView {
    fn assemble(subcategory: Subcategory, category: Option<&Category>) -> Self {
        Self {
            id: subcategory.id,
            name: subcategory.name,
            description: subcategory.description,
            category: category.map(|c| RefView::new(c.id, &c.name)),
            active: subcategory.active,
            timestamps: subcategory.timestamps,
        }
    }
}

/// Outcome of `delete_subcategory`, shaped by the chosen mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubcategoryDeletion {
    Deactivated(SubcategoryDeactivation),
    Removed { subcategory: Subcategory },
}

impl<C, S, P, U> CatalogService<C, S, P, U>
where
    C: Collection<Category> + Clone,
    S: Collection<Subcategory> + Clone,
    P: Collection<Product> + Clone,
    U: Collection<User>,
{
    pub fn create_subcategory(
        &self,
        actor: &Actor,
        input: NewSubcategory,
    ) -> DomainResult<SubcategoryView> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("create subcategory")?;

        let parent = self.validator.validate_subcategory_parent(input.category)?;
        let subcategory =
            Subcategory::create(&input.name, &input.description, input.category, Utc::now())?;
        if self
            .subcategories
            .find_one(&SubcategoryFilter::by_name(subcategory.name.clone()))?
            .is_some()
        {
            return Err(DomainError::duplicate_name(subcategory.name));
        }

        let subcategory = self.subcategories.insert(subcategory)?;
        Ok(SubcategoryView::assemble(subcategory, Some(&parent)))
    }

    /// List subcategories, newest first, parent names resolved in one pass.
    pub fn list_subcategories(
        &self,
        actor: &Actor,
        include_inactive: bool,
    ) -> DomainResult<Vec<SubcategoryView>> {
        authorize_catalog(actor, CatalogAction::Read).into_result("list subcategories")?;

        let filter = if include_inactive {
            SubcategoryFilter::all()
        } else {
            SubcategoryFilter::active()
        };
        let mut subcategories = self.subcategories.find(&filter)?;
        newest_first(&mut subcategories, |s| s.timestamps.created_at);

        let parents: HashMap<CategoryId, Category> = self
            .categories
            .find(&CategoryFilter::all())?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        Ok(subcategories
            .into_iter()
            .map(|s| {
                let parent = parents.get(&s.category);
                SubcategoryView::assemble(s, parent)
            })
            .collect())
    }

    pub fn get_subcategory(
        &self,
        actor: &Actor,
        id: SubcategoryId,
    ) -> DomainResult<SubcategoryView> {
        authorize_catalog(actor, CatalogAction::Read).into_result("get subcategory")?;
        let subcategory = self
            .subcategories
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("subcategory"))?;
        self.subcategory_view(subcategory)
    }

    pub fn update_subcategory(
        &self,
        actor: &Actor,
        id: SubcategoryId,
        update: SubcategoryUpdate,
    ) -> DomainResult<SubcategoryView> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("update subcategory")?;

        let mut subcategory = self
            .subcategories
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("subcategory"))?;
        let now = Utc::now();

        if let Some(name) = &update.name {
            subcategory.rename(name, now)?;
            if self
                .subcategories
                .find_one(&SubcategoryFilter::by_name(subcategory.name.clone()).excluding(id))?
                .is_some()
            {
                return Err(DomainError::duplicate_name(subcategory.name));
            }
        }
        if let Some(description) = &update.description {
            subcategory.describe(description, now);
        }
        if let Some(category) = update.category {
            self.validator.validate_subcategory_parent(category)?;
            subcategory.reparent(category, now);
        }

        let subcategory = self
            .subcategories
            .replace(subcategory)?
            .ok_or_else(|| DomainError::not_found("subcategory"))?;
        self.subcategory_view(subcategory)
    }

    /// Delete a subcategory, soft by default. The engine cascades either way.
    pub fn delete_subcategory(
        &self,
        actor: &Actor,
        id: SubcategoryId,
        mode: DeleteMode,
    ) -> DomainResult<SubcategoryDeletion> {
        match mode {
            DeleteMode::Soft => {
                authorize_catalog(actor, CatalogAction::Mutate)
                    .into_result("deactivate subcategory")?;
                Ok(SubcategoryDeletion::Deactivated(
                    self.engine.soft_delete_subcategory(id, Utc::now())?,
                ))
            }
            DeleteMode::Hard => {
                authorize_catalog(actor, CatalogAction::HardDelete)
                    .into_result("hard-delete subcategory")?;
                Ok(SubcategoryDeletion::Removed {
                    subcategory: self.engine.hard_delete_subcategory(id)?,
                })
            }
        }
    }

    pub fn reactivate_subcategory(
        &self,
        actor: &Actor,
        id: SubcategoryId,
    ) -> DomainResult<SubcategoryView> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("reactivate subcategory")?;
        let subcategory = self.engine.reactivate_subcategory(id, Utc::now())?;
        self.subcategory_view(subcategory)
    }

    fn subcategory_view(&self, subcategory: Subcategory) -> DomainResult<SubcategoryView> {
        let parent = self.categories.find_by_id(subcategory.category.into())?;
        Ok(SubcategoryView::assemble(subcategory, parent.as_ref()))
    }
}
