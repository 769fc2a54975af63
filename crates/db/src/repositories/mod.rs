use async_trait::async_trait;
use thiserror::Error;

use tally_core::domain::customer::Customer;
use tally_core::domain::product::Product;

pub mod customer;
pub mod memory;
pub mod product;

pub use customer::SqlCustomerRepository;
pub use memory::{InMemoryCustomerRepository, InMemoryProductRepository};
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only customer lookups. Matching is case-insensitive substring on the
/// customer name; results are ordered by `(name, id)` so "first match" is
/// stable.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Customer>, RepositoryError>;

    /// Exact (case-insensitive) name match, used after the user picks a
    /// candidate from an ambiguous set.
    async fn find_by_exact_name(&self, name: &str) -> Result<Option<Customer>, RepositoryError>;
}

/// Read-only product lookups. Only the first match per fragment is needed.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn search_first_by_name(
        &self,
        fragment: &str,
    ) -> Result<Option<Product>, RepositoryError>;
}
