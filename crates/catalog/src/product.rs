//! Product: leaf of the hierarchy.
//!
//! A product references both its category and its subcategory; the pair must
//! be consistent (the subcategory's own category reference equals the
//! product's) and is validated on create and on any update that touches the
//! relation fields. The creator reference is informational only: a weak
//! back-reference to the user, with no lifecycle coupling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_core::{
    CategoryId, DomainError, DomainResult, Entity, ProductId, SubcategoryId, Timestamps, UserId,
};
use catalog_store::Document;

use crate::category::valid_name;

/// A product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price; finite and non-negative.
    pub price: f64,
    /// Units on hand.
    pub stock: u32,
    pub category: CategoryId,
    pub subcategory: SubcategoryId,
    /// Weak back-reference to the creating user, when one was authenticated.
    pub created_by: Option<UserId>,
    /// Image URLs.
    pub images: Vec<String>,
    pub active: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Product {
    /// Validate and construct a new product under an already-validated
    /// category/subcategory pair.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        name: &str,
        description: &str,
        price: f64,
        stock: u32,
        category: CategoryId,
        subcategory: SubcategoryId,
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: ProductId::new(),
            name: valid_name(name)?,
            description: description.trim().to_string(),
            price: valid_price(price)?,
            stock,
            category,
            subcategory,
            created_by,
            images: Vec::new(),
            active: true,
            timestamps: Timestamps::at(now),
        })
    }

    pub fn rename(&mut self, name: &str, now: DateTime<Utc>) -> DomainResult<()> {
        self.name = valid_name(name)?;
        self.timestamps.touch(now);
        Ok(())
    }

    pub fn describe(&mut self, description: &str, now: DateTime<Utc>) {
        self.description = description.trim().to_string();
        self.timestamps.touch(now);
    }

    pub fn set_price(&mut self, price: f64, now: DateTime<Utc>) -> DomainResult<()> {
        self.price = valid_price(price)?;
        self.timestamps.touch(now);
        Ok(())
    }

    pub fn set_stock(&mut self, stock: u32, now: DateTime<Utc>) {
        self.stock = stock;
        self.timestamps.touch(now);
    }

    pub fn set_images(&mut self, images: Vec<String>, now: DateTime<Utc>) {
        self.images = images;
        self.timestamps.touch(now);
    }

    /// Move under a different (already validated) category/subcategory pair.
    pub fn reparent(
        &mut self,
        category: CategoryId,
        subcategory: SubcategoryId,
        now: DateTime<Utc>,
    ) {
        self.category = category;
        self.subcategory = subcategory;
        self.timestamps.touch(now);
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.timestamps.touch(now);
    }
}

fn valid_price(price: f64) -> DomainResult<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be non-negative"));
    }
    Ok(price)
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// Filter over the product collection.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub id: Option<ProductId>,
    pub name: Option<String>,
    pub exclude_id: Option<ProductId>,
    /// Products matched directly by category reference.
    pub category: Option<CategoryId>,
    /// Products under one subcategory.
    pub subcategory: Option<SubcategoryId>,
    /// Products under any of a set of subcategories (hard-delete sweep).
    pub subcategory_in: Option<Vec<SubcategoryId>>,
    pub only_active: bool,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self {
            only_active: true,
            ..Self::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_category(category: CategoryId) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn by_subcategory(subcategory: SubcategoryId) -> Self {
        Self {
            subcategory: Some(subcategory),
            ..Self::default()
        }
    }

    pub fn by_subcategories(subcategories: Vec<SubcategoryId>) -> Self {
        Self {
            subcategory_in: Some(subcategories),
            ..Self::default()
        }
    }

    pub fn excluding(mut self, id: ProductId) -> Self {
        self.exclude_id = Some(id);
        self
    }
}

/// Partial updates applied through `update_many`.
#[derive(Debug, Clone)]
pub enum ProductPatch {
    Deactivate { at: DateTime<Utc> },
    Activate { at: DateTime<Utc> },
}

impl Document for Product {
    type Filter = ProductFilter;
    type Patch = ProductPatch;

    fn id(&self) -> Uuid {
        self.id.into()
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        if let Some(id) = filter.id
            && self.id != id
        {
            return false;
        }
        if let Some(name) = &filter.name
            && self.name != *name
        {
            return false;
        }
        if let Some(excluded) = filter.exclude_id
            && self.id == excluded
        {
            return false;
        }
        if let Some(category) = filter.category
            && self.category != category
        {
            return false;
        }
        if let Some(subcategory) = filter.subcategory
            && self.subcategory != subcategory
        {
            return false;
        }
        if let Some(subcategories) = &filter.subcategory_in
            && !subcategories.contains(&self.subcategory)
        {
            return false;
        }
        if filter.only_active && !self.active {
            return false;
        }
        true
    }

    fn apply(&mut self, patch: &ProductPatch) -> bool {
        let (target, at) = match patch {
            ProductPatch::Deactivate { at } => (false, *at),
            ProductPatch::Activate { at } => (true, *at),
        };
        if self.active == target {
            return false;
        }
        self.active = target;
        self.timestamps.touch(at);
        true
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}
