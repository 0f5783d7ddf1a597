//! Database operations for the `brand_catalog` table, and the Postgres-backed
//! [`CatalogSource`] the analyzer reads from.

use aivis_core::BrandCatalogEntry;
use aivis_detect::CatalogSource;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// An active row from the `brand_catalog` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandCatalogRow {
    pub id: i64,
    pub organization_id: Uuid,
    pub name: String,
    pub variants: Value,
    pub is_org_brand: bool,
}

impl BrandCatalogRow {
    /// Convert into a catalog entry. Only string elements of a JSON array
    /// are kept as variants; anything else in `variants` is skipped.
    #[must_use]
    pub fn into_entry(self) -> BrandCatalogEntry {
        let variants = variants_from_json(&self.variants, self.id);
        BrandCatalogEntry {
            name: self.name,
            variants,
            is_org_brand: self.is_org_brand,
        }
    }
}

fn variants_from_json(raw: &Value, row_id: i64) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => {
                    tracing::warn!(row_id, value = %other, "skipping non-string brand variant");
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(row_id, value = %other, "brand variants are not a JSON array; ignoring");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the active catalog rows for an organization, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_brand_catalog(
    pool: &PgPool,
    organization_id: Uuid,
) -> Result<Vec<BrandCatalogRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandCatalogRow>(
        "SELECT id, organization_id, name, variants, is_org_brand \
         FROM brand_catalog \
         WHERE organization_id = $1 AND is_active = true \
         ORDER BY id",
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert a catalog entry for an organization, replacing the variants and
/// side of an existing active entry with the same name (case-insensitive).
///
/// Returns the row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including when the
/// organization does not exist).
pub async fn insert_catalog_entry(
    pool: &PgPool,
    organization_id: Uuid,
    entry: &BrandCatalogEntry,
) -> Result<i64, DbError> {
    let variants = Value::from(entry.variants.clone());
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO brand_catalog (organization_id, name, variants, is_org_brand) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (organization_id, lower(name)) WHERE is_active \
         DO UPDATE SET variants = EXCLUDED.variants, \
                       is_org_brand = EXCLUDED.is_org_brand, \
                       updated_at = NOW() \
         RETURNING id",
    )
    .bind(organization_id)
    .bind(entry.name.trim())
    .bind(variants)
    .bind(entry.is_org_brand)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

// ---------------------------------------------------------------------------
// Catalog source
// ---------------------------------------------------------------------------

/// Reads brand catalogs from the `brand_catalog` table.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogSource for PgCatalog {
    type Error = DbError;

    async fn fetch_catalog(&self, organization_id: &str) -> Result<Vec<BrandCatalogEntry>, DbError> {
        // Organization ids are UUIDs here; anything else cannot name a stored
        // organization and is treated as unknown.
        let Ok(id) = crate::parse_organization_id(organization_id) else {
            tracing::debug!(organization_id, "organization id is not a UUID; empty catalog");
            return Ok(Vec::new());
        };

        let rows = fetch_brand_catalog(&self.pool, id).await?;
        Ok(rows.into_iter().map(BrandCatalogRow::into_entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(variants: Value) -> BrandCatalogRow {
        BrandCatalogRow {
            id: 7,
            organization_id: Uuid::nil(),
            name: "Acme".to_string(),
            variants,
            is_org_brand: true,
        }
    }

    #[test]
    fn string_variants_are_kept_in_order() {
        let entry = row(serde_json::json!(["Acme Corp", "acme.io"])).into_entry();
        assert_eq!(entry.name, "Acme");
        assert!(entry.is_org_brand);
        assert_eq!(entry.variants, vec!["Acme Corp", "acme.io"]);
    }

    #[test]
    fn non_string_variants_are_skipped() {
        let entry = row(serde_json::json!(["Acme Corp", 42, null, {"x": 1}, "ACME"])).into_entry();
        assert_eq!(entry.variants, vec!["Acme Corp", "ACME"]);
    }

    #[test]
    fn non_array_variants_become_empty() {
        assert!(row(serde_json::json!("Acme Corp")).into_entry().variants.is_empty());
        assert!(row(Value::Null).into_entry().variants.is_empty());
    }
}
