//! Subcategory: middle of the hierarchy, owned by exactly one category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_core::{CategoryId, DomainResult, Entity, SubcategoryId, Timestamps};
use catalog_store::Document;

use crate::category::valid_name;

/// A subcategory. The `category` reference must resolve to an existing
/// category at write time (validated by the hierarchy validator, not by the
/// store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub description: String,
    pub category: CategoryId,
    pub active: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Subcategory {
    /// Validate and construct a new subcategory under `category`.
    ///
    /// Parent existence is the caller's responsibility (hierarchy validator
    /// first, then insert).
    pub fn create(
        name: &str,
        description: &str,
        category: CategoryId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: SubcategoryId::new(),
            name: valid_name(name)?,
            description: description.trim().to_string(),
            category,
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

    /// Move under a different (already validated) category.
    pub fn reparent(&mut self, category: CategoryId, now: DateTime<Utc>) {
        self.category = category;
        self.timestamps.touch(now);
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.timestamps.touch(now);
    }
}

impl Entity for Subcategory {
    type Id = SubcategoryId;

    fn id(&self) -> &SubcategoryId {
        &self.id
    }
}

/// Filter over the subcategory collection.
#[derive(Debug, Clone, Default)]
pub struct SubcategoryFilter {
    pub id: Option<SubcategoryId>,
    pub name: Option<String>,
    pub exclude_id: Option<SubcategoryId>,
    /// Constrain to children of one category (cascade steps, branch checks).
    pub category: Option<CategoryId>,
    pub only_active: bool,
}

impl SubcategoryFilter {
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

    /// All subcategories under one category.
    pub fn under(category: CategoryId) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Constrained lookup: one subcategory id *within* one category. A
    /// subcategory that exists on another branch does not match.
    pub fn id_under(id: SubcategoryId, category: CategoryId) -> Self {
        Self {
            id: Some(id),
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn excluding(mut self, id: SubcategoryId) -> Self {
        self.exclude_id = Some(id);
        self
    }
}

/// Partial updates applied through `update_many`.
#[derive(Debug, Clone)]
pub enum SubcategoryPatch {
    Deactivate { at: DateTime<Utc> },
    Activate { at: DateTime<Utc> },
}

impl Document for Subcategory {
    type Filter = SubcategoryFilter;
    type Patch = SubcategoryPatch;

    fn id(&self) -> Uuid {
        self.id.into()
    }

    fn matches(&self, filter: &SubcategoryFilter) -> bool {
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
        if filter.only_active && !self.active {
            return false;
        }
        true
    }

    fn apply(&mut self, patch: &SubcategoryPatch) -> bool {
        let (target, at) = match patch {
            SubcategoryPatch::Deactivate { at } => (false, *at),
            SubcategoryPatch::Activate { at } => (true, *at),
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
