//! Category operations.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use catalog_auth::{Actor, CatalogAction, User, authorize_catalog};
use catalog_core::{CategoryId, DomainError, DomainResult};
use catalog_domain::{
    Category, CategoryDeactivation, CategoryFilter, DeleteMode, Product, Subcategory,
};
use catalog_store::Collection;

use crate::service::{CatalogService, newest_first};

/// Create payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Outcome of `delete_category`, shaped by the chosen mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryDeletion {
    /// Reversible: the category and cascade counts.
    Deactivated(CategoryDeactivation),
    /// Irreversible: the removed category.
    Removed { category: Category },
}

impl<C, S, P, U> CatalogService<C, S, P, U>
where
    C: Collection<Category> + Clone,
    S: Collection<Subcategory> + Clone,
    P: Collection<Product> + Clone,
    U: Collection<User>,
{
    pub fn create_category(&self, actor: &Actor, input: NewCategory) -> DomainResult<Category> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("create category")?;

        let category = Category::create(&input.name, &input.description, Utc::now())?;
        if self
            .categories
            .find_one(&CategoryFilter::by_name(category.name.clone()))?
            .is_some()
        {
            return Err(DomainError::duplicate_name(category.name));
        }

        // The store's own unique index is the backstop for the narrow
        // check-then-insert race; its violation maps to the same error.
        Ok(self.categories.insert(category)?)
    }

    /// List categories, newest first. Inactive ones are hidden unless
    /// `include_inactive` is set.
    pub fn list_categories(
        &self,
        actor: &Actor,
        include_inactive: bool,
    ) -> DomainResult<Vec<Category>> {
        authorize_catalog(actor, CatalogAction::Read).into_result("list categories")?;

        let filter = if include_inactive {
            CategoryFilter::all()
        } else {
            CategoryFilter::active()
        };
        let mut categories = self.categories.find(&filter)?;
        newest_first(&mut categories, |c| c.timestamps.created_at);
        Ok(categories)
    }

    /// Fetch by id regardless of active flag.
    pub fn get_category(&self, actor: &Actor, id: CategoryId) -> DomainResult<Category> {
        authorize_catalog(actor, CatalogAction::Read).into_result("get category")?;
        self.categories
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("category"))
    }

    pub fn update_category(
        &self,
        actor: &Actor,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> DomainResult<Category> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("update category")?;

        let mut category = self
            .categories
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("category"))?;
        let now = Utc::now();

        if let Some(name) = &update.name {
            category.rename(name, now)?;
            if self
                .categories
                .find_one(&CategoryFilter::by_name(category.name.clone()).excluding(id))?
                .is_some()
            {
                return Err(DomainError::duplicate_name(category.name));
            }
        }
        if let Some(description) = &update.description {
            category.describe(description, now);
        }

        self.categories
            .replace(category)?
            .ok_or_else(|| DomainError::not_found("category"))
    }

    /// Delete a category, soft by default. Soft deletion needs mutation
    /// rights; permanent deletion is admin-only.
    pub fn delete_category(
        &self,
        actor: &Actor,
        id: CategoryId,
        mode: DeleteMode,
    ) -> DomainResult<CategoryDeletion> {
        match mode {
            DeleteMode::Soft => {
                authorize_catalog(actor, CatalogAction::Mutate)
                    .into_result("deactivate category")?;
                Ok(CategoryDeletion::Deactivated(
                    self.engine.soft_delete_category(id, Utc::now())?,
                ))
            }
            DeleteMode::Hard => {
                authorize_catalog(actor, CatalogAction::HardDelete)
                    .into_result("hard-delete category")?;
                Ok(CategoryDeletion::Removed {
                    category: self.engine.hard_delete_category(id)?,
                })
            }
        }
    }

    pub fn reactivate_category(&self, actor: &Actor, id: CategoryId) -> DomainResult<Category> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("reactivate category")?;
        self.engine.reactivate_category(id, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{admin, auxiliar, coordinator, service};

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn create_requires_mutation_rights() {
        let svc = service();
        assert!(svc.create_category(&coordinator(), new_category("Tools")).is_ok());

        let err = svc
            .create_category(&auxiliar(), new_category("Garden"))
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let svc = service();
        let actor = admin();
        svc.create_category(&actor, new_category("Tools")).unwrap();

        let err = svc
            .create_category(&actor, new_category("Tools"))
            .unwrap_err();
        assert_eq!(err, DomainError::duplicate_name("Tools"));
    }

    #[test]
    fn listing_hides_inactive_by_default() {
        let svc = service();
        let actor = admin();
        let tools = svc.create_category(&actor, new_category("Tools")).unwrap();
        svc.create_category(&actor, new_category("Garden")).unwrap();

        svc.delete_category(&actor, tools.id, DeleteMode::Soft).unwrap();

        let visible = svc.list_categories(&actor, false).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Garden");

        let all = svc.list_categories(&actor, true).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn listing_is_newest_first() {
        let svc = service();
        let actor = admin();
        svc.create_category(&actor, new_category("First")).unwrap();
        svc.create_category(&actor, new_category("Second")).unwrap();

        let listed = svc.list_categories(&actor, false).unwrap();
        assert_eq!(listed[0].name, "Second");
        assert_eq!(listed[1].name, "First");
    }

    #[test]
    fn get_returns_inactive_categories_too() {
        let svc = service();
        let actor = admin();
        let tools = svc.create_category(&actor, new_category("Tools")).unwrap();
        svc.delete_category(&actor, tools.id, DeleteMode::Soft).unwrap();

        let fetched = svc.get_category(&actor, tools.id).unwrap();
        assert!(!fetched.active);
    }

    #[test]
    fn rename_checks_uniqueness_excluding_self() {
        let svc = service();
        let actor = admin();
        let tools = svc.create_category(&actor, new_category("Tools")).unwrap();
        svc.create_category(&actor, new_category("Garden")).unwrap();

        // Saving under its own name is not a collision.
        let update = CategoryUpdate {
            name: Some("Tools".to_string()),
            description: Some("hand tools".to_string()),
        };
        let updated = svc.update_category(&actor, tools.id, update).unwrap();
        assert_eq!(updated.description, "hand tools");

        // Renaming onto a sibling is.
        let update = CategoryUpdate {
            name: Some("Garden".to_string()),
            ..Default::default()
        };
        let err = svc.update_category(&actor, tools.id, update).unwrap_err();
        assert_eq!(err.code(), "duplicate_name");
    }

    #[test]
    fn partial_update_leaves_unsupplied_fields_alone() {
        let svc = service();
        let actor = admin();
        let tools = svc
            .create_category(
                &actor,
                NewCategory {
                    name: "Tools".to_string(),
                    description: "hand tools".to_string(),
                },
            )
            .unwrap();

        let update = CategoryUpdate {
            description: Some("power tools".to_string()),
            ..Default::default()
        };
        let updated = svc.update_category(&actor, tools.id, update).unwrap();
        assert_eq!(updated.name, "Tools");
        assert_eq!(updated.description, "power tools");
    }

    #[test]
    fn hard_delete_is_admin_only() {
        let svc = service();
        let tools = svc.create_category(&admin(), new_category("Tools")).unwrap();

        let err = svc
            .delete_category(&coordinator(), tools.id, DeleteMode::Hard)
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");

        let deleted = svc
            .delete_category(&admin(), tools.id, DeleteMode::Hard)
            .unwrap();
        assert!(matches!(deleted, CategoryDeletion::Removed { .. }));
        assert_eq!(
            svc.get_category(&admin(), tools.id).unwrap_err().code(),
            "not_found"
        );
    }

    #[test]
    fn reactivate_restores_visibility() {
        let svc = service();
        let actor = coordinator();
        let tools = svc.create_category(&actor, new_category("Tools")).unwrap();
        svc.delete_category(&actor, tools.id, DeleteMode::Soft).unwrap();
        assert!(svc.list_categories(&actor, false).unwrap().is_empty());

        let restored = svc.reactivate_category(&actor, tools.id).unwrap();
        assert!(restored.active);
        assert_eq!(svc.list_categories(&actor, false).unwrap().len(), 1);
    }
}
