//! In-memory repositories mirroring the SQL matching semantics, used by the
//! agent runtime tests and anywhere a database is unwanted.

use async_trait::async_trait;

use tally_core::domain::customer::Customer;
use tally_core::domain::product::Product;

use super::{CustomerRepository, ProductRepository, RepositoryError};

#[derive(Clone, Debug, Default)]
pub struct InMemoryCustomerRepository {
    customers: Vec<Customer>,
}

impl InMemoryCustomerRepository {
    pub fn new(mut customers: Vec<Customer>) -> Self {
        // Same stable order the SQL repository guarantees.
        customers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.0.cmp(&b.id.0)));
        Self { customers }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Customer>, RepositoryError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .customers
            .iter()
            .filter(|customer| customer.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_exact_name(&self, name: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .customers
            .iter()
            .find(|customer| customer.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryProductRepository {
    products: Vec<Product>,
}

impl InMemoryProductRepository {
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.0.cmp(&b.id.0)));
        Self { products }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn search_first_by_name(
        &self,
        fragment: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .products
            .iter()
            .find(|product| product.name.to_lowercase().contains(&needle))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use tally_core::domain::customer::{Customer, CustomerId};
    use tally_core::domain::product::{Product, ProductId};

    use super::{InMemoryCustomerRepository, InMemoryProductRepository};
    use crate::repositories::{CustomerRepository, ProductRepository};

    fn customer(name: &str) -> Customer {
        Customer {
            id: CustomerId(Uuid::new_v4()),
            name: name.to_string(),
            phone: Some("900000000".to_string()),
            email: None,
        }
    }

    fn product(name: &str) -> Product {
        Product {
            id: ProductId(format!("prod-{}", name.to_ascii_lowercase().replace(' ', "-"))),
            name: name.to_string(),
            unit_price: Decimal::new(200, 2),
            strip_price: Decimal::new(3000, 2),
        }
    }

    #[tokio::test]
    async fn customer_search_is_case_insensitive_substring() {
        let repo = InMemoryCustomerRepository::new(vec![
            customer("Hrishita Sharma"),
            customer("Hrishita Rao"),
            customer("Aarav Mehta"),
        ]);

        let matches = repo.search_by_name("hrishita").await.expect("search");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Hrishita Rao");
        assert_eq!(matches[1].name, "Hrishita Sharma");
    }

    #[tokio::test]
    async fn exact_name_lookup_ignores_case() {
        let repo = InMemoryCustomerRepository::new(vec![customer("Hrishita Sharma")]);
        let found = repo.find_by_exact_name("hrishita sharma").await.expect("lookup");
        assert_eq!(found.map(|c| c.name), Some("Hrishita Sharma".to_string()));

        let repo = InMemoryCustomerRepository::new(vec![customer("Hrishita Sharma")]);
        assert!(repo.find_by_exact_name("Hrishita").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn product_lookup_returns_first_by_name_order() {
        let repo = InMemoryProductRepository::new(vec![
            product("Dolo 650"),
            product("Azithral 500"),
            product("Pantocid 40"),
        ]);

        let found = repo.search_first_by_name("0").await.expect("search");
        assert_eq!(found.map(|p| p.name), Some("Azithral 500".to_string()));

        let missing = repo.search_first_by_name("Zincovit").await.expect("search");
        assert!(missing.is_none());
    }
}
