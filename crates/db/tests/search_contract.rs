//! Repository contract tests against a migrated in-memory database seeded
//! with the demo fixtures.

use rust_decimal::Decimal;

use tally_db::repositories::{
    CustomerRepository, ProductRepository, SqlCustomerRepository, SqlProductRepository,
};
use tally_db::{connect_with_settings, fixtures, migrations, DbPool};

async fn seeded_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    fixtures::seed(&pool).await.expect("seed");
    pool
}

#[tokio::test]
async fn unique_substring_match_returns_single_customer() {
    let pool = seeded_pool().await;
    let customers = SqlCustomerRepository::new(pool);

    let matches = customers.search_by_name("aarav").await.expect("search");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Aarav Mehta");
    assert_eq!(matches[0].phone.as_deref(), Some("+91 99670 77889"));
}

#[tokio::test]
async fn zero_matches_returns_empty() {
    let pool = seeded_pool().await;
    let customers = SqlCustomerRepository::new(pool);

    let matches = customers.search_by_name("Zorro").await.expect("search");
    assert!(matches.is_empty());
}

#[tokio::test]
async fn duplicate_first_names_all_match_in_name_order() {
    let pool = seeded_pool().await;
    let customers = SqlCustomerRepository::new(pool);

    let matches = customers.search_by_name("HRISHITA").await.expect("search");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].name, "Hrishita Rao");
    assert_eq!(matches[1].name, "Hrishita Sharma");
}

#[tokio::test]
async fn exact_name_lookup_is_case_insensitive_and_exact() {
    let pool = seeded_pool().await;
    let customers = SqlCustomerRepository::new(pool);

    let found =
        customers.find_by_exact_name("hrishita rao").await.expect("lookup").expect("present");
    assert_eq!(found.name, "Hrishita Rao");

    // A substring is not an exact name.
    assert!(customers.find_by_exact_name("Hrishita").await.expect("lookup").is_none());
}

#[tokio::test]
async fn product_lookup_returns_first_match_and_decodes_prices() {
    let pool = seeded_pool().await;
    let products = SqlProductRepository::new(pool);

    let crocin =
        products.search_first_by_name("crocin").await.expect("search").expect("present");
    assert_eq!(crocin.name, "Crocin Advance");
    assert_eq!(crocin.unit_price, Decimal::new(200, 2));
    assert_eq!(crocin.strip_price, Decimal::new(3000, 2));

    // Several names contain "0"; name ordering makes the winner stable.
    let first = products.search_first_by_name("0").await.expect("search").expect("present");
    assert_eq!(first.name, "Azithral 500");

    assert!(products.search_first_by_name("Zincovit").await.expect("search").is_none());
}

#[tokio::test]
async fn reseeding_is_idempotent() {
    let pool = seeded_pool().await;
    let summary = fixtures::seed(&pool).await.expect("second seed");
    assert_eq!(summary.customers, fixtures::SEED_CUSTOMERS.len());

    let customers = SqlCustomerRepository::new(pool);
    let matches = customers.search_by_name("Hrishita").await.expect("search");
    assert_eq!(matches.len(), 2, "re-seed must not duplicate rows");
}
