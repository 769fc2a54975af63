//! Customer and product name resolution outcomes.
//!
//! The repositories run the actual lookups; the decision of what a result
//! set *means* (unique match, ambiguity to surface, nothing found) lives
//! here so it stays pure and testable.

use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerResolution {
    /// Exactly one customer matched.
    Resolved(Customer),
    /// More than one matched; the caller must ask the user to choose.
    Ambiguous(Vec<String>),
    NotFound,
}

pub fn resolve_customer(matches: Vec<Customer>) -> CustomerResolution {
    match matches.len() {
        0 => CustomerResolution::NotFound,
        1 => {
            let customer = matches.into_iter().next().expect("one match");
            CustomerResolution::Resolved(customer)
        }
        _ => CustomerResolution::Ambiguous(
            matches.into_iter().map(|customer| customer.name).collect(),
        ),
    }
}

/// Split the extractor's comma-separated product list, preserving order.
/// Entries are trimmed but not deduplicated or dropped; lookup of an empty
/// fragment matches the first catalog row, as the original substring query
/// did.
pub fn split_product_names(raw: &str) -> Vec<String> {
    raw.split(',').map(|name| name.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::domain::customer::{Customer, CustomerId};

    use super::{resolve_customer, split_product_names, CustomerResolution};

    fn customer(name: &str) -> Customer {
        Customer {
            id: CustomerId(Uuid::new_v4()),
            name: name.to_string(),
            phone: None,
            email: None,
        }
    }

    #[test]
    fn zero_matches_is_not_found() {
        assert_eq!(resolve_customer(Vec::new()), CustomerResolution::NotFound);
    }

    #[test]
    fn single_match_resolves_to_that_record() {
        let resolved = resolve_customer(vec![customer("Hrishita Sharma")]);
        match resolved {
            CustomerResolution::Resolved(customer) => {
                assert_eq!(customer.name, "Hrishita Sharma")
            }
            other => panic!("expected resolved, got {other:?}"),
        }
    }

    #[test]
    fn multiple_matches_list_every_candidate_name() {
        let resolved = resolve_customer(vec![
            customer("Hrishita Sharma"),
            customer("Hrishita Rao"),
            customer("Hrishita Iyer"),
        ]);
        match resolved {
            CustomerResolution::Ambiguous(names) => {
                assert_eq!(names.len(), 3);
                assert_eq!(names[0], "Hrishita Sharma");
                assert_eq!(names[2], "Hrishita Iyer");
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn product_names_split_in_order() {
        assert_eq!(
            split_product_names("Augmentin, Crocin ,Dolo 650"),
            vec!["Augmentin", "Crocin", "Dolo 650"]
        );
    }
}
