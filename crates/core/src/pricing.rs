//! Line-item pricing for billing intents.
//!
//! Pricing is deterministic: quantities come straight from the extracted
//! intent, rates are a pure function of the unit type, and totals round to
//! two decimals with banker's rounding.

use rust_decimal::Decimal;

use crate::domain::invoice::LineItem;
use crate::domain::product::Product;
use crate::errors::DomainError;

/// The unit type that selects the strip price tier. Anything else bills at
/// the loose unit price.
pub const STRIP_UNIT_TYPE: &str = "strip";

/// Parse a comma-separated quantity list ("2, 3") into integers.
///
/// Any non-integer entry is fatal for the whole turn; there is no partial
/// recovery.
pub fn parse_quantities(raw: &str) -> Result<Vec<i64>, DomainError> {
    raw.split(',')
        .map(|piece| {
            let trimmed = piece.trim();
            trimmed
                .parse::<i64>()
                .map_err(|_| DomainError::InvalidQuantity { value: trimmed.to_string() })
        })
        .collect()
}

pub fn select_rate(product: &Product, unit_type: &str) -> Decimal {
    if unit_type.eq_ignore_ascii_case(STRIP_UNIT_TYPE) {
        product.strip_price
    } else {
        product.unit_price
    }
}

/// Build line items from resolved products and their parallel quantities.
///
/// A `None` product is skipped and its quantity discarded, so an invoice may
/// omit items whose name failed to resolve. Lists of unequal length zip down
/// to the shorter one.
pub fn build_line_items(
    products: &[Option<Product>],
    quantities: &[i64],
    unit_type: &str,
) -> Vec<LineItem> {
    products
        .iter()
        .zip(quantities.iter())
        .filter_map(|(product, &quantity)| {
            product.as_ref().map(|product| {
                let rate = select_rate(product, unit_type);
                LineItem {
                    product_name: product.name.clone(),
                    quantity,
                    rate,
                    total: (rate * Decimal::from(quantity)).round_dp(2),
                }
            })
        })
        .collect()
}

pub fn grand_total(lines: &[LineItem]) -> Decimal {
    lines.iter().map(|line| line.total).sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::product::{Product, ProductId};

    use super::{build_line_items, grand_total, parse_quantities, select_rate};

    fn product(name: &str, unit_price: &str, strip_price: &str) -> Product {
        Product {
            id: ProductId(format!("prod-{}", name.to_ascii_lowercase())),
            name: name.to_string(),
            unit_price: unit_price.parse().expect("unit price"),
            strip_price: strip_price.parse().expect("strip price"),
        }
    }

    #[test]
    fn parses_comma_separated_quantities_with_whitespace() {
        assert_eq!(parse_quantities("2, 3").expect("quantities"), vec![2, 3]);
        assert_eq!(parse_quantities(" 10 ").expect("quantities"), vec![10]);
    }

    #[test]
    fn non_numeric_quantity_is_fatal() {
        let error = parse_quantities("2, two").expect_err("should reject");
        assert_eq!(error.to_string(), "invalid quantity `two` (expected an integer)");
    }

    #[test]
    fn empty_quantity_list_is_fatal() {
        parse_quantities("").expect_err("empty input has no integer");
    }

    #[test]
    fn rate_follows_unit_type_case_insensitively() {
        let augmentin = product("Augmentin", "22.50", "204.00");
        assert_eq!(select_rate(&augmentin, "strip"), Decimal::new(20400, 2));
        assert_eq!(select_rate(&augmentin, "STRIP"), Decimal::new(20400, 2));
        assert_eq!(select_rate(&augmentin, "Strip"), Decimal::new(20400, 2));
        assert_eq!(select_rate(&augmentin, "unit"), Decimal::new(2250, 2));
        assert_eq!(select_rate(&augmentin, "bottle"), Decimal::new(2250, 2));
    }

    #[test]
    fn line_total_is_quantity_times_rate_rounded() {
        let items = build_line_items(
            &[Some(product("Crocin", "1.135", "20.00"))],
            &[3],
            "unit",
        );
        assert_eq!(items.len(), 1);
        // 3 * 1.135 = 3.405, banker's rounding to 3.40
        assert_eq!(items[0].total, Decimal::new(340, 2));
    }

    #[test]
    fn unresolved_products_are_skipped_with_their_quantity() {
        let items = build_line_items(
            &[Some(product("Augmentin", "22.50", "204.00")), None],
            &[2, 3],
            "strip",
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Augmentin");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(grand_total(&items), Decimal::new(40800, 2));
    }

    #[test]
    fn mismatched_lengths_zip_to_shorter() {
        let items = build_line_items(
            &[Some(product("Augmentin", "22.50", "204.00"))],
            &[2, 3, 4],
            "unit",
        );
        assert_eq!(items.len(), 1);

        let items = build_line_items(
            &[
                Some(product("Augmentin", "22.50", "204.00")),
                Some(product("Crocin", "2.00", "20.00")),
            ],
            &[5],
            "unit",
        );
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn grand_total_is_invariant_under_permutation() {
        let products = vec![
            Some(product("Augmentin", "22.50", "204.00")),
            Some(product("Crocin", "2.00", "20.00")),
            Some(product("Dolo", "1.75", "30.50")),
        ];
        let quantities = vec![2, 3, 7];
        let forward = build_line_items(&products, &quantities, "strip");

        let mut reversed_products = products.clone();
        reversed_products.reverse();
        let mut reversed_quantities = quantities.clone();
        reversed_quantities.reverse();
        let backward = build_line_items(&reversed_products, &reversed_quantities, "strip");

        assert_eq!(grand_total(&forward), grand_total(&backward));
    }
}
