//! Deterministic demo dataset for local sessions and contract tests.
//!
//! The two "Hrishita" customers exist on purpose: they exercise the
//! disambiguation path. "Irfan Qureshi" has no phone or email so invoices
//! render the N/A fallbacks.

use crate::repositories::RepositoryError;
use crate::DbPool;

pub struct SeedCustomer {
    pub id: &'static str,
    pub name: &'static str,
    pub phone: Option<&'static str>,
    pub email: Option<&'static str>,
}

pub struct SeedProduct {
    pub id: &'static str,
    pub name: &'static str,
    pub unit_price: &'static str,
    pub strip_price: &'static str,
}

pub const SEED_CUSTOMERS: &[SeedCustomer] = &[
    SeedCustomer {
        id: "7c9e4e1a-20f3-4b42-9c61-3f6f2a1d8b01",
        name: "Hrishita Sharma",
        phone: Some("+91 98200 11223"),
        email: Some("hrishita.sharma@example.com"),
    },
    SeedCustomer {
        id: "1d2b7a88-6f54-4f0e-8a3d-b9c5de402c02",
        name: "Hrishita Rao",
        phone: Some("+91 98450 44556"),
        email: Some("hrishita.rao@example.com"),
    },
    SeedCustomer {
        id: "9a4f3c21-0d87-49de-b2c4-51e8aa913d03",
        name: "Aarav Mehta",
        phone: Some("+91 99670 77889"),
        email: Some("aarav.mehta@example.com"),
    },
    SeedCustomer {
        id: "e5b1d906-7a3c-4f5b-8e0f-2c94be671a04",
        name: "Meera Pillai",
        phone: Some("+91 98110 99001"),
        email: Some("meera.pillai@example.com"),
    },
    SeedCustomer {
        id: "3f8c2b5d-91e0-4a76-bd18-6d07cf583e05",
        name: "Irfan Qureshi",
        phone: None,
        email: None,
    },
];

pub const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct { id: "prod-augmentin-625", name: "Augmentin 625", unit_price: "22.50", strip_price: "204.00" },
    SeedProduct { id: "prod-crocin-advance", name: "Crocin Advance", unit_price: "2.00", strip_price: "30.00" },
    SeedProduct { id: "prod-dolo-650", name: "Dolo 650", unit_price: "1.75", strip_price: "30.50" },
    SeedProduct { id: "prod-azithral-500", name: "Azithral 500", unit_price: "11.90", strip_price: "71.40" },
    SeedProduct { id: "prod-pantocid-40", name: "Pantocid 40", unit_price: "4.50", strip_price: "67.50" },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
}

/// Load the demo dataset. Idempotent: re-seeding replaces rows by id.
pub async fn seed(pool: &DbPool) -> Result<SeedSummary, RepositoryError> {
    let mut tx = pool.begin().await?;

    for customer in SEED_CUSTOMERS {
        sqlx::query(
            "INSERT OR REPLACE INTO customers (id, name, phone, email) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(customer.id)
        .bind(customer.name)
        .bind(customer.phone)
        .bind(customer.email)
        .execute(&mut *tx)
        .await?;
    }

    for product in SEED_PRODUCTS {
        sqlx::query(
            "INSERT OR REPLACE INTO products (id, name, unit_price, strip_price) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(product.id)
        .bind(product.name)
        .bind(product.unit_price)
        .bind(product.strip_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(SeedSummary { customers: SEED_CUSTOMERS.len(), products: SEED_PRODUCTS.len() })
}
