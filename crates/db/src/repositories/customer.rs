use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use tally_core::domain::customer::{Customer, CustomerId};

use super::{CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, phone, email FROM customers \
             WHERE name LIKE '%' || ?1 || '%' \
             ORDER BY name, id",
        )
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_customer).collect()
    }

    async fn find_by_exact_name(&self, name: &str) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, phone, email FROM customers \
             WHERE lower(name) = lower(?1) \
             ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_customer).transpose()
    }
}

fn row_to_customer(row: &SqliteRow) -> Result<Customer, RepositoryError> {
    let raw_id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|error| RepositoryError::Decode(format!("customer id `{raw_id}`: {error}")))?;

    Ok(Customer {
        id: CustomerId(id),
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
    })
}
