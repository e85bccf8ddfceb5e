//! Reference data: the skins catalog, where it comes from, and how it loads.
//!
//! - `catalog`: the immutable catalog and the store that owns it
//! - `source`: HTTP / file catalog sources
//! - `loader`: the one-shot asynchronous loader
//! - `sample`: synthetic trade-up cards drawn from the catalog

pub mod catalog;
pub mod loader;
pub mod sample;
pub mod source;

pub use catalog::{Catalog, CatalogStore};
pub use loader::CatalogLoader;
pub use sample::{SampleConfig, generate_sample};
pub use source::{CatalogSource, CatalogSpec, FileCatalogSource, HttpCatalogSource};
