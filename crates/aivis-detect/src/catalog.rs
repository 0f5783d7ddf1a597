//! Where an analyzer gets each organization's brand catalog from.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;

use aivis_core::{BrandCatalogEntry, CatalogFile};

/// A per-organization brand catalog lookup.
///
/// An unknown organization should yield an empty catalog, not an error;
/// errors are reserved for a lookup that could not be performed.
pub trait CatalogSource {
    type Error: std::fmt::Display;

    fn fetch_catalog(
        &self,
        organization_id: &str,
    ) -> impl Future<Output = Result<Vec<BrandCatalogEntry>, Self::Error>> + Send;
}

/// In-memory catalogs keyed by organization id.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    catalogs: HashMap<String, Vec<BrandCatalogEntry>>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_organization(
        mut self,
        organization_id: impl Into<String>,
        brands: Vec<BrandCatalogEntry>,
    ) -> Self {
        self.catalogs.insert(organization_id.into(), brands);
        self
    }

    #[must_use]
    pub fn organization_count(&self) -> usize {
        self.catalogs.len()
    }
}

impl From<CatalogFile> for StaticCatalog {
    fn from(file: CatalogFile) -> Self {
        Self {
            catalogs: file
                .organizations
                .into_iter()
                .map(|org| (org.organization_id, org.brands))
                .collect(),
        }
    }
}

impl CatalogSource for StaticCatalog {
    type Error = Infallible;

    async fn fetch_catalog(
        &self,
        organization_id: &str,
    ) -> Result<Vec<BrandCatalogEntry>, Self::Error> {
        Ok(self
            .catalogs
            .get(organization_id)
            .cloned()
            .unwrap_or_default())
    }
}
