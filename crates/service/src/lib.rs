//! `catalog-service` — the operations consumed by the boundary layer.
//!
//! Thin composition of access policy + hierarchy validator + lifecycle engine
//! + entity store. HTTP routing, hashing, and token signing stay outside; the
//! boundary hands us an authenticated [`catalog_auth::Actor`] and gets back
//! domain results it can wrap in the [`response`] envelope.

pub mod category;
pub mod identity;
pub mod product;
pub mod response;
pub mod service;
pub mod subcategory;
pub mod users;


pub use category::{CategoryDeletion, CategoryUpdate, NewCategory};
pub use identity::{AuthResponse, IdentityService, SigninRequest, SignupRequest};
pub use product::{CreatorView, NewProduct, ProductDeletion, ProductUpdate, ProductView, RefView};
pub use response::Envelope;
pub use service::CatalogService;
pub use subcategory::{NewSubcategory, SubcategoryDeletion, SubcategoryUpdate, SubcategoryView};
pub use users::{UserDirectory, UserUpdate, UserView};
