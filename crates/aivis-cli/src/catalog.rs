//! `catalog` command handlers.

use std::path::Path;

use aivis_core::{CatalogFile, OrganizationCatalog};
use aivis_detect::MIN_TERM_CHARS;

/// Per-organization counts printed by `catalog check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrganizationSummary {
    pub(crate) organization_id: String,
    pub(crate) org_brands: usize,
    pub(crate) competitors: usize,
    pub(crate) terms: usize,
    /// Names and variants too short to ever be detected.
    pub(crate) unmatchable: Vec<String>,
}

pub(crate) fn summarize(file: &CatalogFile) -> Vec<OrganizationSummary> {
    file.organizations.iter().map(summarize_organization).collect()
}

fn summarize_organization(org: &OrganizationCatalog) -> OrganizationSummary {
    let terms: Vec<String> = org
        .brands
        .iter()
        .flat_map(|entry| {
            let term = entry.term();
            term.terms().map(str::to_string).collect::<Vec<_>>()
        })
        .collect();
    let unmatchable = terms
        .iter()
        .filter(|t| t.trim().chars().count() < MIN_TERM_CHARS)
        .cloned()
        .collect();

    OrganizationSummary {
        organization_id: org.organization_id.clone(),
        org_brands: org.org_brands().count(),
        competitors: org.competitors().count(),
        terms: terms.len(),
        unmatchable,
    }
}

/// Validate a catalog file and print a per-organization summary.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub(crate) fn run_catalog_check(path: &Path) -> anyhow::Result<()> {
    let file = aivis_core::load_catalog(path)?;
    let summaries = summarize(&file);

    println!("{}: {} organization(s)", path.display(), summaries.len());
    println!("{:<38}{:<8}{:<13}TERMS", "ORGANIZATION", "OWN", "COMPETITORS");
    for summary in &summaries {
        println!(
            "{:<38}{:<8}{:<13}{}",
            summary.organization_id, summary.org_brands, summary.competitors, summary.terms
        );
        for term in &summary.unmatchable {
            tracing::warn!(
                organization_id = %summary.organization_id,
                term = %term,
                "term is shorter than {MIN_TERM_CHARS} characters and will never match"
            );
        }
        if summary.org_brands == 0 {
            tracing::warn!(
                organization_id = %summary.organization_id,
                "organization has no own brand; its score can never exceed 2"
            );
        }
    }

    Ok(())
}

/// Load every organization of a catalog file into the database.
///
/// Organization ids must be UUIDs. Entries are upserted by case-insensitive
/// name, so re-importing the same file is harmless.
///
/// # Errors
///
/// Returns an error if the file is invalid, an organization id is not a UUID,
/// or a database write fails.
pub(crate) async fn run_catalog_import(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let file = aivis_core::load_catalog(path)?;

    // Reject the whole file before writing anything.
    let organizations = file
        .organizations
        .iter()
        .map(|org| Ok((aivis_db::parse_organization_id(&org.organization_id)?, org)))
        .collect::<Result<Vec<_>, aivis_db::DbError>>()?;

    for (id, org) in organizations {
        aivis_db::insert_organization(pool, id, org.display_name()).await?;
        for entry in &org.brands {
            aivis_db::insert_catalog_entry(pool, id, entry).await?;
        }
        tracing::info!(organization_id = %id, brands = org.brands.len(), "imported catalog");
        println!("{id}: {} brand(s)", org.brands.len());
    }

    Ok(())
}
