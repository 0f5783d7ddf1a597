//! Database operations for the `organizations` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `organizations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Insert an organization, or rename it if the id already exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn insert_organization(pool: &PgPool, id: Uuid, name: &str) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO organizations (id, name) VALUES ($1, $2) \
         ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
    )
    .bind(id)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the organization with `id`, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_organization(pool: &PgPool, id: Uuid) -> Result<Option<OrganizationRow>, DbError> {
    let row = sqlx::query_as::<_, OrganizationRow>(
        "SELECT id, name, created_at FROM organizations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
