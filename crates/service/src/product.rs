//! Product operations.
//!
//! Reads resolve the category/subcategory references to names and the
//! creator reference to a user summary. Whether the creator is visible at
//! all depends on the actor: the read policy may order it redacted.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_auth::{Actor, CatalogAction, RedactedField, User, UserFilter, authorize_catalog};
use catalog_core::{
    CategoryId, DomainError, DomainResult, ProductId, SubcategoryId, Timestamps, UserId,
};
use catalog_domain::{
    Category, CategoryFilter, DeleteMode, Product, ProductFilter, Subcategory, SubcategoryFilter,
};
use catalog_store::Collection;

use crate::service::{CatalogService, newest_first};

/// Create payload. The category/subcategory pair is validated for
/// consistency before the insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    pub category: CategoryId,
    pub subcategory: SubcategoryId,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update: only supplied fields change. Touching either relation
/// field re-validates the *resulting* pair, so a move cannot leave the
/// product pointing across branches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub category: Option<CategoryId>,
    pub subcategory: Option<SubcategoryId>,
    pub images: Option<Vec<String>>,
}

/// A resolved entity reference: id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefView {
    pub id: Uuid,
    pub name: String,
}

impl RefView {
    pub(crate) fn new(id: impl Into<Uuid>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Creator summary embedded in product reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorView {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl CreatorView {
    fn of(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// A product with references resolved for display. `created_by` is `None`
/// when the product has no recorded creator, the creator's record is gone,
/// or the read policy redacted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub category: Option<RefView>,
    pub subcategory: Option<RefView>,
    pub created_by: Option<CreatorView>,
    pub images: Vec<String>,
    pub active: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Outcome of `delete_product`, shaped by the chosen mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductDeletion {
    Deactivated { product: Product },
    Removed { product: Product },
}

/// Pre-fetched lookup tables for view assembly over a whole listing.
struct RefTables {
    categories: HashMap<CategoryId, Category>,
    subcategories: HashMap<SubcategoryId, Subcategory>,
    users: HashMap<UserId, User>,
    redact_creator: bool,
}

impl RefTables {
    fn view(&self, product: Product) -> ProductView {
        let category = self
            .categories
            .get(&product.category)
            .map(|c| RefView::new(c.id, &c.name));
        let subcategory = self
            .subcategories
            .get(&product.subcategory)
            .map(|s| RefView::new(s.id, &s.name));
        let created_by = if self.redact_creator {
            None
        } else {
            product
                .created_by
                .and_then(|id| self.users.get(&id))
                .map(CreatorView::of)
        };
        ProductView {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category,
            subcategory,
            created_by,
            images: product.images,
            active: product.active,
            timestamps: product.timestamps,
        }
    }
}

impl<C, S, P, U> CatalogService<C, S, P, U>
where
    C: Collection<Category> + Clone,
    S: Collection<Subcategory> + Clone,
    P: Collection<Product> + Clone,
    U: Collection<User>,
{
    pub fn create_product(&self, actor: &Actor, input: NewProduct) -> DomainResult<ProductView> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("create product")?;

        self.validator
            .validate_product_parents(input.category, input.subcategory)?;
        let mut product = Product::create(
            &input.name,
            &input.description,
            input.price,
            input.stock,
            input.category,
            input.subcategory,
            Some(actor.id),
            Utc::now(),
        )?;
        if !input.images.is_empty() {
            product.set_images(input.images, Utc::now());
        }
        if self
            .products
            .find_one(&ProductFilter::by_name(product.name.clone()))?
            .is_some()
        {
            return Err(DomainError::duplicate_name(product.name));
        }

        let product = self.products.insert(product)?;
        self.product_view(actor, product)
    }

    /// List products, newest first, references resolved in one pass.
    pub fn list_products(
        &self,
        actor: &Actor,
        include_inactive: bool,
    ) -> DomainResult<Vec<ProductView>> {
        let redactions =
            authorize_catalog(actor, CatalogAction::Read).into_result("list products")?;

        let filter = if include_inactive {
            ProductFilter::all()
        } else {
            ProductFilter::active()
        };
        let mut products = self.products.find(&filter)?;
        newest_first(&mut products, |p| p.timestamps.created_at);

        let tables = self.ref_tables(&redactions)?;
        Ok(products.into_iter().map(|p| tables.view(p)).collect())
    }

    pub fn get_product(&self, actor: &Actor, id: ProductId) -> DomainResult<ProductView> {
        authorize_catalog(actor, CatalogAction::Read).into_result("get product")?;
        let product = self
            .products
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("product"))?;
        self.product_view(actor, product)
    }

    pub fn update_product(
        &self,
        actor: &Actor,
        id: ProductId,
        update: ProductUpdate,
    ) -> DomainResult<ProductView> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("update product")?;

        let mut product = self
            .products
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("product"))?;
        let now = Utc::now();

        if let Some(name) = &update.name {
            product.rename(name, now)?;
            if self
                .products
                .find_one(&ProductFilter::by_name(product.name.clone()).excluding(id))?
                .is_some()
            {
                return Err(DomainError::duplicate_name(product.name));
            }
        }
        if let Some(description) = &update.description {
            product.describe(description, now);
        }
        if let Some(price) = update.price {
            product.set_price(price, now)?;
        }
        if let Some(stock) = update.stock {
            product.set_stock(stock, now);
        }
        if let Some(images) = update.images {
            product.set_images(images, now);
        }
        if update.category.is_some() || update.subcategory.is_some() {
            let category = update.category.unwrap_or(product.category);
            let subcategory = update.subcategory.unwrap_or(product.subcategory);
            self.validator
                .validate_product_parents(category, subcategory)?;
            product.reparent(category, subcategory, now);
        }

        let product = self
            .products
            .replace(product)?
            .ok_or_else(|| DomainError::not_found("product"))?;
        self.product_view(actor, product)
    }

    /// Delete a product, soft by default. Products are leaves, so neither
    /// mode cascades further.
    pub fn delete_product(
        &self,
        actor: &Actor,
        id: ProductId,
        mode: DeleteMode,
    ) -> DomainResult<ProductDeletion> {
        match mode {
            DeleteMode::Soft => {
                authorize_catalog(actor, CatalogAction::Mutate).into_result("deactivate product")?;
                Ok(ProductDeletion::Deactivated {
                    product: self.engine.soft_delete_product(id, Utc::now())?,
                })
            }
            DeleteMode::Hard => {
                authorize_catalog(actor, CatalogAction::HardDelete)
                    .into_result("hard-delete product")?;
                Ok(ProductDeletion::Removed {
                    product: self.engine.hard_delete_product(id)?,
                })
            }
        }
    }

    pub fn reactivate_product(&self, actor: &Actor, id: ProductId) -> DomainResult<ProductView> {
        authorize_catalog(actor, CatalogAction::Mutate).into_result("reactivate product")?;
        let product = self.engine.reactivate_product(id, Utc::now())?;
        self.product_view(actor, product)
    }

    fn product_view(&self, actor: &Actor, product: Product) -> DomainResult<ProductView> {
        let redactions =
            authorize_catalog(actor, CatalogAction::Read).into_result("view product")?;
        let tables = self.ref_tables(&redactions)?;
        Ok(tables.view(product))
    }

    fn ref_tables(&self, redactions: &[RedactedField]) -> DomainResult<RefTables> {
        Ok(RefTables {
            categories: self
                .categories
                .find(&CategoryFilter::all())?
                .into_iter()
                .map(|c| (c.id, c))
                .collect(),
            subcategories: self
                .subcategories
                .find(&SubcategoryFilter::all())?
                .into_iter()
                .map(|s| (s.id, s))
                .collect(),
            users: self
                .users
                .find(&UserFilter::all())?
                .into_iter()
                .map(|u| (u.id, u))
                .collect(),
            redact_creator: redactions.contains(&RedactedField::CreatedBy),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_auth::Role;
    use crate::category::NewCategory;
    use crate::service::testutil::{admin, auxiliar, known_actor, service, MemService};
    use crate::subcategory::NewSubcategory;

    fn seed_pair(svc: &MemService) -> (CategoryId, SubcategoryId) {
        let category = svc
            .create_category(
                &admin(),
                NewCategory {
                    name: "Electronics".to_string(),
                    description: String::new(),
                },
            )
            .unwrap()
            .id;
        let subcategory = svc
            .create_subcategory(
                &admin(),
                NewSubcategory {
                    name: "Phones".to_string(),
                    description: String::new(),
                    category,
                },
            )
            .unwrap()
            .id;
        (category, subcategory)
    }

    fn new_product(name: &str, category: CategoryId, subcategory: SubcategoryId) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: 699.0,
            stock: 10,
            category,
            subcategory,
            images: Vec::new(),
        }
    }

    #[test]
    fn create_resolves_references_and_creator() {
        let svc = service();
        let (category, subcategory) = seed_pair(&svc);
        let creator = known_actor(&svc, "carla", Role::Coordinador);

        let view = svc
            .create_product(&creator, new_product("Pixel", category, subcategory))
            .unwrap();
        assert_eq!(view.category.unwrap().name, "Electronics");
        assert_eq!(view.subcategory.unwrap().name, "Phones");
        let created_by = view.created_by.unwrap();
        assert_eq!(created_by.username, "carla");
        assert_eq!(created_by.id, creator.id);
    }

    #[test]
    fn create_rejects_cross_branch_pair() {
        let svc = service();
        let (_, subcategory) = seed_pair(&svc);
        let other = svc
            .create_category(
                &admin(),
                NewCategory {
                    name: "Office".to_string(),
                    description: String::new(),
                },
            )
            .unwrap()
            .id;

        let err = svc
            .create_product(&admin(), new_product("Pixel", other, subcategory))
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("subcategory"));
    }

    #[test]
    fn auxiliar_reads_with_creator_redacted() {
        let svc = service();
        let (category, subcategory) = seed_pair(&svc);
        let creator = known_actor(&svc, "carla", Role::Coordinador);
        let pixel = svc
            .create_product(&creator, new_product("Pixel", category, subcategory))
            .unwrap();

        let view = svc.get_product(&auxiliar(), pixel.id).unwrap();
        assert!(view.created_by.is_none());
        // Everything else stays visible.
        assert_eq!(view.name, "Pixel");
        assert_eq!(view.category.unwrap().name, "Electronics");

        let listed = svc.list_products(&auxiliar(), false).unwrap();
        assert!(listed[0].created_by.is_none());

        let listed = svc.list_products(&creator, false).unwrap();
        assert!(listed[0].created_by.is_some());
    }

    #[test]
    fn partial_update_validates_resulting_pair() {
        let svc = service();
        let actor = admin();
        let (category, subcategory) = seed_pair(&svc);
        let pixel = svc
            .create_product(&actor, new_product("Pixel", category, subcategory))
            .unwrap();

        let other = svc
            .create_category(
                &actor,
                NewCategory {
                    name: "Office".to_string(),
                    description: String::new(),
                },
            )
            .unwrap()
            .id;

        // Moving only the category leaves the subcategory on the old branch.
        let err = svc
            .update_product(
                &actor,
                pixel.id,
                ProductUpdate {
                    category: Some(other),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("subcategory"));

        // Supplying a consistent pair succeeds.
        let desks = svc
            .create_subcategory(
                &actor,
                NewSubcategory {
                    name: "Desks".to_string(),
                    description: String::new(),
                    category: other,
                },
            )
            .unwrap()
            .id;
        let moved = svc
            .update_product(
                &actor,
                pixel.id,
                ProductUpdate {
                    category: Some(other),
                    subcategory: Some(desks),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.subcategory.unwrap().name, "Desks");
    }

    #[test]
    fn scalar_updates_apply_independently() {
        let svc = service();
        let actor = admin();
        let (category, subcategory) = seed_pair(&svc);
        let pixel = svc
            .create_product(&actor, new_product("Pixel", category, subcategory))
            .unwrap();

        let updated = svc
            .update_product(
                &actor,
                pixel.id,
                ProductUpdate {
                    price: Some(649.0),
                    stock: Some(3),
                    images: Some(vec!["pixel.png".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price, 649.0);
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.images, vec!["pixel.png".to_string()]);
        assert_eq!(updated.name, "Pixel");

        let err = svc
            .update_product(
                &actor,
                pixel.id,
                ProductUpdate {
                    price: Some(-1.0),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn soft_delete_hides_then_reactivate_restores() {
        let svc = service();
        let actor = admin();
        let (category, subcategory) = seed_pair(&svc);
        let pixel = svc
            .create_product(&actor, new_product("Pixel", category, subcategory))
            .unwrap();

        svc.delete_product(&actor, pixel.id, DeleteMode::Soft).unwrap();
        assert!(svc.list_products(&actor, false).unwrap().is_empty());
        assert_eq!(svc.list_products(&actor, true).unwrap().len(), 1);

        let restored = svc.reactivate_product(&actor, pixel.id).unwrap();
        assert!(restored.active);
    }

    #[test]
    fn hard_delete_removes_the_record() {
        let svc = service();
        let (category, subcategory) = seed_pair(&svc);
        let pixel = svc
            .create_product(&admin(), new_product("Pixel", category, subcategory))
            .unwrap();

        let removed = svc
            .delete_product(&admin(), pixel.id, DeleteMode::Hard)
            .unwrap();
        assert!(matches!(removed, ProductDeletion::Removed { .. }));
        assert_eq!(
            svc.get_product(&admin(), pixel.id).unwrap_err().code(),
            "not_found"
        );
    }
}
