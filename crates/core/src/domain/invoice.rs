use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

impl InvoiceId {
    /// Derive an id from the issue time at one-second resolution
    /// (`INV-YYYYMMDDHHMMSS`). Two invoices issued within the same second
    /// share an id; the renderer overwrites on collision.
    pub fn from_datetime(issued_at: DateTime<Utc>) -> Self {
        Self(format!("INV-{}", issued_at.format("%Y%m%d%H%M%S")))
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The customer fields frozen onto an invoice at issue time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_name: String,
    pub quantity: i64,
    pub rate: Decimal,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer: CustomerSnapshot,
    pub lines: Vec<LineItem>,
    pub grand_total: Decimal,
    pub issued_at: DateTime<Utc>,
}

impl Invoice {
    pub fn issue(customer: &Customer, lines: Vec<LineItem>, issued_at: DateTime<Utc>) -> Self {
        let grand_total = crate::pricing::grand_total(&lines);
        Self {
            id: InvoiceId::from_datetime(issued_at),
            customer: CustomerSnapshot::from(customer),
            lines,
            grand_total,
            issued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::InvoiceId;

    #[test]
    fn id_is_second_granular() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 9, 41, 7).unwrap();
        assert_eq!(InvoiceId::from_datetime(at).0, "INV-20260315094107");
    }

    #[test]
    fn same_second_issues_collide() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 9, 41, 7).unwrap();
        let later = at + chrono::Duration::milliseconds(900);
        assert_eq!(InvoiceId::from_datetime(at), InvoiceId::from_datetime(later));
    }
}
