//! Category: top of the three-level hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_core::{CategoryId, DomainError, DomainResult, Entity, Timestamps};
use catalog_store::Document;

/// A category. Owns zero-or-more subcategories; `name` is unique within the
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub active: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Category {
    /// Validate and construct a new category (active, trimmed fields).
    pub fn create(name: &str, description: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: CategoryId::new(),
            name: valid_name(name)?,
            description: description.trim().to_string(),
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

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.timestamps.touch(now);
    }
}

/// Shared name validation for the three catalog collections.
pub(crate) fn valid_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("name is required"));
    }
    Ok(trimmed.to_string())
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

/// Filter over the category collection.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub id: Option<CategoryId>,
    pub name: Option<String>,
    /// Excluded id, for uniqueness-excluding-self checks on rename.
    pub exclude_id: Option<CategoryId>,
    /// When set, only documents with `active != false`.
    pub only_active: bool,
}

impl CategoryFilter {
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

    pub fn excluding(mut self, id: CategoryId) -> Self {
        self.exclude_id = Some(id);
        self
    }
}

/// Partial updates applied through `update_many`.
#[derive(Debug, Clone)]
pub enum CategoryPatch {
    Deactivate { at: DateTime<Utc> },
    Activate { at: DateTime<Utc> },
}

impl Document for Category {
    type Filter = CategoryFilter;
    type Patch = CategoryPatch;

    fn id(&self) -> Uuid {
        self.id.into()
    }

    fn matches(&self, filter: &CategoryFilter) -> bool {
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
        if filter.only_active && !self.active {
            return false;
        }
        true
    }

    fn apply(&mut self, patch: &CategoryPatch) -> bool {
        let (target, at) = match patch {
            CategoryPatch::Deactivate { at } => (false, *at),
            CategoryPatch::Activate { at } => (true, *at),
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
