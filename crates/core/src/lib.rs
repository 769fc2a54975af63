pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod resolution;

pub use domain::customer::{Customer, CustomerId};
pub use domain::invoice::{Invoice, InvoiceId, LineItem};
pub use domain::product::{Product, ProductId};
pub use errors::DomainError;
pub use resolution::CustomerResolution;
