//! patrika-common: Shared article model, storage traits, and site
//! configuration for the patrika publication.
//!
//! This crate provides:
//! - `Article` / `NewArticle` / `ArticlePatch` - the bilingual article model
//! - `ArticleStore` trait with an in-memory implementation
//! - `AssetStore` trait for uploaded images
//! - `SiteConfig` with file-backed load/save

pub mod article;
pub mod assets;
pub mod config;
pub mod error;
pub mod store;

pub use article::{
    Article, ArticlePatch, Author, Category, NewArticle, Socials, estimate_read_time,
    read_time_for_markup,
};
pub use assets::{AssetError, AssetStore, MemoryAssetStore};
pub use config::{FileStore, Loader, Saver, SiteConfig};
pub use error::PatrikaError;
pub use store::{ArticleStore, MemoryStore, StoreError};
