use std::path::Path;

use super::*;

#[test]
fn variants_default_to_empty_when_absent() {
    let yaml = "
organizations:
  - organization_id: acme
    brands:
      - name: Acme
        is_org_brand: true
";
    let catalog = parse_catalog(yaml).expect("valid catalog");
    let org = catalog.organization("acme").expect("org present");
    assert_eq!(org.brands.len(), 1);
    assert!(org.brands[0].variants.is_empty());
    assert!(org.brands[0].is_org_brand);
}

#[test]
fn null_variants_are_treated_as_empty() {
    let yaml = "
organizations:
  - organization_id: acme
    brands:
      - name: Globex
        variants: ~
";
    let catalog = parse_catalog(yaml).expect("valid catalog");
    let brand = &catalog.organizations[0].brands[0];
    assert!(brand.variants.is_empty());
    assert!(!brand.is_org_brand, "is_org_brand defaults to false");
}

#[test]
fn non_string_variants_are_skipped_individually() {
    let yaml = "
organizations:
  - organization_id: acme
    brands:
      - name: Acme
        variants: [Acme Corp, 42, {nested: true}, ACME Inc, [x]]
        is_org_brand: true
";
    let catalog = parse_catalog(yaml).expect("valid catalog");
    assert_eq!(
        catalog.organizations[0].brands[0].variants,
        vec!["Acme Corp".to_string(), "ACME Inc".to_string()]
    );
}

#[test]
fn json_variants_are_lenient_too() {
    let entry: BrandCatalogEntry = serde_json::from_str(
        r#"{"name":"Initech","variants":["Initech LLC",null,7],"is_org_brand":false}"#,
    )
    .expect("deserialize entry");
    assert_eq!(entry.variants, vec!["Initech LLC".to_string()]);
}

#[test]
fn org_brands_and_competitors_partition_the_catalog() {
    let org = OrganizationCatalog {
        organization_id: "acme".to_string(),
        name: None,
        brands: vec![
            BrandCatalogEntry::org_brand("Acme"),
            BrandCatalogEntry::competitor("Globex"),
            BrandCatalogEntry::competitor("Initech"),
        ],
    };
    let own: Vec<&str> = org.org_brands().map(|b| b.name.as_str()).collect();
    let others: Vec<&str> = org.competitors().map(|b| b.name.as_str()).collect();
    assert_eq!(own, vec!["Acme"]);
    assert_eq!(others, vec!["Globex", "Initech"]);
    assert_eq!(org.display_name(), "acme");
}

#[test]
fn brand_term_lists_canonical_name_first() {
    let term = BrandCatalogEntry::org_brand("Acme")
        .with_variants(["Acme Corp", "ACME"])
        .term();
    let terms: Vec<&str> = term.terms().collect();
    assert_eq!(terms, vec!["Acme", "Acme Corp", "ACME"]);
}

#[test]
fn validate_rejects_empty_brand_name() {
    let yaml = "
organizations:
  - organization_id: acme
    brands:
      - name: '  '
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("empty name"), "got: {err}");
}

#[test]
fn validate_rejects_duplicate_brand_name_case_insensitively() {
    let yaml = "
organizations:
  - organization_id: acme
    brands:
      - name: Globex
      - name: globex
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate brand name"), "got: {err}");
}

#[test]
fn validate_allows_same_brand_in_different_organizations() {
    let yaml = "
organizations:
  - organization_id: acme
    brands:
      - name: Globex
  - organization_id: hooli
    brands:
      - name: Globex
";
    assert!(parse_catalog(yaml).is_ok());
}

#[test]
fn validate_rejects_duplicate_organization() {
    let yaml = "
organizations:
  - organization_id: acme
  - organization_id: acme
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate organization_id"), "got: {err}");
}

#[test]
fn validate_rejects_empty_organization_id() {
    let yaml = "
organizations:
  - organization_id: ''
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("organization_id must be non-empty"));
}

#[test]
fn load_catalog_reports_missing_file() {
    let err = load_catalog(Path::new("/nonexistent/catalog.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::CatalogFileIo { .. }), "got: {err:?}");
}

#[test]
fn load_catalog_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("catalog.yaml");
    assert!(
        path.exists(),
        "catalog.yaml missing at {path:?} — required for this test"
    );
    let catalog = load_catalog(&path).expect("load catalog.yaml");
    assert!(!catalog.organizations.is_empty());
    for org in &catalog.organizations {
        assert!(
            org.org_brands().count() >= 1,
            "organization '{}' has no org brand",
            org.organization_id
        );
    }
}
