//! Catalog Source Adapters

mod fake_catalog_source;
mod http_catalog_source;

pub use fake_catalog_source::FakeCatalogSource;
pub use http_catalog_source::{HttpCatalogSource, HttpCatalogSourceConfig};
