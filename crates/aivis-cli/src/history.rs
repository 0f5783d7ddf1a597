//! `history` command handler.

/// Print the most recent stored analyses for an organization.
///
/// # Errors
///
/// Returns an error if the organization id is not a UUID or the query fails.
pub(crate) async fn run_history(pool: &sqlx::PgPool, org: &str, limit: i64) -> anyhow::Result<()> {
    let organization_id = aivis_db::parse_organization_id(org)?;
    let rows = aivis_db::list_brand_analyses(pool, organization_id, limit).await?;

    if rows.is_empty() {
        println!("no analyses stored for organization '{org}'; run `analyze --persist` first");
        return Ok(());
    }

    println!(
        "{:<18}{:<8}{:<6}{:<14}{:<14}COMPETITORS",
        "CREATED", "SCORE", "RANK", "OUTCOME", "PROVIDER"
    );
    for row in &rows {
        let created = row.created_at.format("%Y-%m-%d %H:%M").to_string();
        let rank = row
            .org_brand_prominence
            .map_or_else(|| "-".to_string(), |r| r.to_string());
        let analysis = row.to_analysis();
        println!(
            "{:<18}{:<8}{:<6}{:<14}{:<14}{}",
            created,
            row.score,
            rank,
            row.outcome,
            row.provider.as_deref().unwrap_or("-"),
            analysis.competitors.join(", ")
        );
    }

    Ok(())
}
