use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::*;
use crate::ingest::DropReason;

const TOKEN: i64 = 1_760_000_000;

fn options() -> PlanOptions {
    PlanOptions { batch_token: TOKEN }
}

fn product(id: &str, name: &str, url: &str, price: &str) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        name: name.to_string(),
        source_url: url.to_string(),
        price: Decimal::from_str(price).expect("valid price"),
        ..ProductRecord::default()
    }
}

fn kept_ids(plan: &BatchPlan) -> Vec<&str> {
    plan.kept.iter().map(|r| r.id.as_str()).collect()
}

// -----------------------------------------------------------------------
// Counting
// -----------------------------------------------------------------------

#[test]
fn first_and_third_sharing_pair_keeps_two() {
    let records = vec![
        product("", "Keten Gömlek", "https://s.example/p/1", "100"),
        product("", "Kazak", "https://s.example/p/2", "150"),
        product("", "Keten Gömlek", "https://s.example/p/1", "100"),
    ];
    let plan = plan_batch(records, &CatalogSnapshot::default(), &options());

    assert_eq!(plan.kept.len(), 2);
    assert_eq!(plan.duplicates_filtered(), 1);
    assert_eq!(plan.original_count, 3);
    assert_eq!(plan.dropped[0].index, 2);
    assert_eq!(plan.dropped[0].reason, DropReason::DuplicateInBatch);
}

#[test]
fn kept_plus_dropped_equals_original() {
    let snapshot = CatalogSnapshot::new(["https://s.example/p/9".to_string()], []);
    let records = vec![
        product("", "A", "https://s.example/p/1", "10"),
        product("", "A", "https://s.example/p/1", "10"),
        product("", "B", "https://s.example/p/9", "10"),
        product("", "", "", "0"),
        product("x", "C", "", "-1"),
    ];
    let plan = plan_batch(records, &snapshot, &options());
    let summary = plan.summary(0);

    assert_eq!(
        summary.records_stored + summary.duplicates_filtered,
        summary.original_count
    );
    assert_eq!(summary.records_stored, 3);
    assert_eq!(summary.duplicates_filtered, 2);
}

// -----------------------------------------------------------------------
// Catalog duplicates
// -----------------------------------------------------------------------

#[test]
fn persisted_url_drops_record_even_with_different_name() {
    let snapshot = CatalogSnapshot::new(["https://s.example/p/1".to_string()], []);
    let records = vec![product("", "Renamed Shirt", "https://s.example/p/1", "50")];
    let plan = plan_batch(records, &snapshot, &options());

    assert!(plan.kept.is_empty());
    assert_eq!(plan.dropped[0].reason, DropReason::PersistedSourceUrl);
    assert_eq!(plan.dropped[0].name, "Renamed Shirt");
}

#[test]
fn dropped_record_does_not_reserve_its_identifier() {
    let snapshot = CatalogSnapshot::new(["https://s.example/p/1".to_string()], []);
    let records = vec![
        product("", "Shirt", "https://s.example/p/1", "50"),
        product("", "Shirt", "https://s.example/p/2", "50"),
    ];
    let plan = plan_batch(records, &snapshot, &options());
    assert_eq!(kept_ids(&plan), vec!["shirt"]);
}

// -----------------------------------------------------------------------
// Identifiers
// -----------------------------------------------------------------------

#[test]
fn identifiers_are_unique_within_batch_and_against_catalog() {
    let snapshot = CatalogSnapshot::new([], ["shirt".to_string(), "sku-1".to_string()]);
    let records = vec![
        product("sku-1", "Shirt", "https://s.example/p/1", "10"),
        product("", "Shirt", "https://s.example/p/2", "10"),
        product("", "Shirt", "https://s.example/p/3", "10"),
        product("shirt-1", "Other", "", "10"),
        product("", "", "", "10"),
        product("", "", "", "10"),
    ];
    let plan = plan_batch(records, &snapshot, &options());

    let ids: HashSet<&str> = kept_ids(&plan).into_iter().collect();
    assert_eq!(ids.len(), plan.kept.len(), "ids must be unique: {ids:?}");
    for id in &ids {
        assert!(!snapshot.existing_ids.contains(*id), "{id} collides");
    }
    assert_eq!(
        kept_ids(&plan),
        vec![
            "sku-1-1",
            "shirt-1",
            "shirt-2",
            "shirt-1-1",
            "product-1760000000-4",
            "product-1760000000-5",
        ]
    );
}

#[test]
fn later_records_observe_earlier_assignments() {
    let records = vec![
        product("", "Üç Gün", "", "10"),
        product("uc-gun", "Another", "", "10"),
    ];
    let plan = plan_batch(records, &CatalogSnapshot::default(), &options());
    assert_eq!(kept_ids(&plan), vec!["uc-gun", "uc-gun-1"]);
    assert_eq!(plan.id_rewrites.len(), 1);
    assert_eq!(plan.id_rewrites[0].requested, "uc-gun");
    assert_eq!(plan.id_rewrites[0].assigned, "uc-gun-1");
}

#[test]
fn derived_slug_collisions_are_not_reported_as_rewrites() {
    let snapshot = CatalogSnapshot::new([], ["shirt".to_string()]);
    let plan = plan_batch(
        vec![product("", "Shirt", "", "10")],
        &snapshot,
        &options(),
    );
    assert_eq!(kept_ids(&plan), vec!["shirt-1"]);
    assert!(plan.id_rewrites.is_empty());
}

#[test]
fn generated_identifier_is_non_empty() {
    let plan = plan_batch(
        vec![product("", "", "", "10")],
        &CatalogSnapshot::default(),
        &options(),
    );
    assert!(!plan.kept[0].id.is_empty());
    assert_eq!(plan.kept[0].id, "product-1760000000-0");
}

// -----------------------------------------------------------------------
// Pricing
// -----------------------------------------------------------------------

#[test]
fn derived_price_is_recomputed_and_input_value_ignored() {
    let mut record = product("", "Shirt", "", "100");
    record.derived_price = Some(Decimal::from(1));
    let mut free = product("", "Gift", "", "0");
    free.derived_price = Some(Decimal::from(999));

    let plan = plan_batch(vec![record, free], &CatalogSnapshot::default(), &options());

    assert_eq!(plan.kept[0].derived_price, Some(Decimal::from(12000)));
    assert_eq!(plan.kept[1].derived_price, None);
}

#[test]
fn price_is_rounded_to_cents_before_tiering() {
    let records = vec![
        product("", "A", "", "100.004"),
        product("", "B", "", "100.005"),
    ];
    let plan = plan_batch(records, &CatalogSnapshot::default(), &options());

    assert_eq!(plan.kept[0].price, Decimal::from(100));
    assert_eq!(plan.kept[0].derived_price, Some(Decimal::from(12000)));
    assert_eq!(plan.kept[1].price, Decimal::from_str("100.01").expect("valid"));
    assert_eq!(plan.kept[1].derived_price, Some(Decimal::from(10001)));
}

#[test]
fn derived_price_does_not_depend_on_batch_order() {
    let a = product("", "A", "", "150.01");
    let b = product("", "B", "", "350");
    let forward = plan_batch(
        vec![a.clone(), b.clone()],
        &CatalogSnapshot::default(),
        &options(),
    );
    let reverse = plan_batch(vec![b, a], &CatalogSnapshot::default(), &options());

    assert_eq!(forward.kept[0].derived_price, reverse.kept[1].derived_price);
    assert_eq!(forward.kept[1].derived_price, reverse.kept[0].derived_price);
}

// -----------------------------------------------------------------------
// Supersession
// -----------------------------------------------------------------------

#[test]
fn supersede_pairs_cover_only_complete_pairs() {
    let records = vec![
        product("", "A", "https://s.example/p/1", "10"),
        product("", "B", "", "10"),
        product("", "", "https://s.example/p/3", "10"),
    ];
    let plan = plan_batch(records, &CatalogSnapshot::default(), &options());
    assert_eq!(
        plan.supersede_pairs(),
        vec![("A".to_string(), "https://s.example/p/1".to_string())]
    );
}

#[test]
fn plan_options_use_unix_seconds() {
    let now = DateTime::parse_from_rfc3339("2026-10-18T00:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc);
    assert_eq!(PlanOptions::at(now).batch_token, now.timestamp());
}
