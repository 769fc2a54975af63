use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use tally_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn search_first_by_name(
        &self,
        fragment: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, unit_price, strip_price FROM products \
             WHERE name LIKE '%' || ?1 || '%' \
             ORDER BY name, id LIMIT 1",
        )
        .bind(fragment)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }
}

fn row_to_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: ProductId(row.try_get("id")?),
        name: row.try_get("name")?,
        unit_price: decode_price(row, "unit_price")?,
        strip_price: decode_price(row, "strip_price")?,
    })
}

// sqlx has no rust_decimal support on sqlite, so prices travel as TEXT.
fn decode_price(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw)
        .map_err(|error| RepositoryError::Decode(format!("{column} `{raw}`: {error}")))
}
