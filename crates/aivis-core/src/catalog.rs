use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ConfigError;

/// A brand's matchable names: the canonical name plus its aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandTerm {
    pub canonical_name: String,
    pub variants: Vec<String>,
}

impl BrandTerm {
    /// Canonical name first, then variants in catalog order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str()).chain(self.variants.iter().map(String::as_str))
    }
}

/// One tracked brand for an organization, either its own brand or a competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandCatalogEntry {
    pub name: String,
    /// Absent or `null` becomes empty. Non-string entries are dropped.
    #[serde(default, deserialize_with = "lenient_variants")]
    pub variants: Vec<String>,
    #[serde(default)]
    pub is_org_brand: bool,
}

impl BrandCatalogEntry {
    #[must_use]
    pub fn org_brand(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            is_org_brand: true,
        }
    }

    #[must_use]
    pub fn competitor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            is_org_brand: false,
        }
    }

    #[must_use]
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn term(&self) -> BrandTerm {
        BrandTerm {
            canonical_name: self.name.clone(),
            variants: self.variants.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVariant {
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_variants<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawVariant>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            RawVariant::Text(s) => Some(s),
            RawVariant::Other(_) => None,
        })
        .collect())
}

/// The tracked brands of a single organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationCatalog {
    pub organization_id: String,
    /// Human-readable name; falls back to the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub brands: Vec<BrandCatalogEntry>,
}

impl OrganizationCatalog {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.organization_id)
    }

    pub fn org_brands(&self) -> impl Iterator<Item = &BrandCatalogEntry> {
        self.brands.iter().filter(|b| b.is_org_brand)
    }

    pub fn competitors(&self) -> impl Iterator<Item = &BrandCatalogEntry> {
        self.brands.iter().filter(|b| !b.is_org_brand)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub organizations: Vec<OrganizationCatalog>,
}

impl CatalogFile {
    #[must_use]
    pub fn organization(&self, organization_id: &str) -> Option<&OrganizationCatalog> {
        self.organizations
            .iter()
            .find(|o| o.organization_id == organization_id)
    }
}

/// Load and validate a brand catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate a brand catalog from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not a valid catalog.
pub fn parse_catalog(content: &str) -> Result<CatalogFile, ConfigError> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut seen_orgs = HashSet::new();

    for org in &catalog.organizations {
        let org_id = org.organization_id.trim();
        if org_id.is_empty() {
            return Err(ConfigError::Validation(
                "organization_id must be non-empty".to_string(),
            ));
        }
        if !seen_orgs.insert(org_id.to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate organization_id: '{org_id}'"
            )));
        }

        let mut seen_names = HashSet::new();
        for brand in &org.brands {
            if brand.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "organization '{org_id}' has a brand with an empty name"
                )));
            }
            if !seen_names.insert(brand.name.trim().to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "organization '{org_id}' has duplicate brand name: '{}'",
                    brand.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
