use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::{cart::CartLineWithPrice, orders::CheckoutRequest},
    entity::orders::DeliveryOption,
    error::{AppError, AppResult},
    services::cart_aggregator::GroupedCart,
};

/// Charged once per store-order when delivery is selected.
pub const FLAT_DELIVERY_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

/// One store's share of a checkout, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub store_id: Uuid,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub items: Vec<DraftItem>,
}

pub fn validate_checkout(request: &CheckoutRequest) -> AppResult<()> {
    if request.phone_number.trim().is_empty() {
        return Err(AppError::Validation("phone_number is required".into()));
    }
    if request.delivery_option == DeliveryOption::Delivery
        && request
            .location
            .as_deref()
            .is_none_or(|location| location.trim().is_empty())
    {
        return Err(AppError::Validation(
            "location is required for delivery orders".into(),
        ));
    }
    Ok(())
}

/// Validate the request, then turn every store group into an order draft.
pub fn split_into_orders(cart: &GroupedCart, request: &CheckoutRequest) -> AppResult<Vec<OrderDraft>> {
    validate_checkout(request)?;

    let delivery_fee = match request.delivery_option {
        DeliveryOption::Delivery => FLAT_DELIVERY_FEE,
        DeliveryOption::Pickup => Decimal::ZERO,
    };

    let drafts = cart
        .iter()
        .map(|(store_id, lines)| {
            let subtotal = store_subtotal(lines);
            OrderDraft {
                store_id: *store_id,
                subtotal,
                delivery_fee,
                total: subtotal + delivery_fee,
                items: lines
                    .iter()
                    .map(|line| DraftItem {
                        product_id: line.product_id,
                        quantity: line.quantity,
                        price_at_purchase: line.price,
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(drafts)
}

pub fn store_subtotal(lines: &[CartLineWithPrice]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum()
}

pub fn grand_total(drafts: &[OrderDraft]) -> Decimal {
    drafts.iter().map(|draft| draft.total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity::orders::PaymentMethod, services::cart_aggregator::group_by_store};

    fn request(delivery_option: DeliveryOption, location: Option<&str>) -> CheckoutRequest {
        CheckoutRequest {
            delivery_option,
            phone_number: "555-0100".into(),
            order_notes: None,
            location: location.map(str::to_string),
            payment_method: PaymentMethod::Cash,
        }
    }

    fn line(store_id: Uuid, price: Decimal, quantity: i32) -> CartLineWithPrice {
        CartLineWithPrice {
            cart_item_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            store_id,
            quantity,
            price,
        }
    }

    fn two_store_cart() -> (Uuid, Uuid, GroupedCart) {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let cart = group_by_store(vec![
            line(a, Decimal::new(10, 0), 2),
            line(b, Decimal::new(5, 0), 1),
        ])
        .unwrap();
        (a, b, cart)
    }

    fn total_for(drafts: &[OrderDraft], store_id: Uuid) -> Decimal {
        drafts
            .iter()
            .find(|d| d.store_id == store_id)
            .map(|d| d.total)
            .unwrap()
    }

    #[test]
    fn pickup_has_no_fee() {
        let (a, b, cart) = two_store_cart();
        let drafts = split_into_orders(&cart, &request(DeliveryOption::Pickup, None)).unwrap();

        assert_eq!(total_for(&drafts, a), Decimal::new(2000, 2));
        assert_eq!(total_for(&drafts, b), Decimal::new(500, 2));
        assert_eq!(grand_total(&drafts), Decimal::new(2500, 2));
    }

    #[test]
    fn delivery_fee_is_charged_once_per_store() {
        let (a, b, cart) = two_store_cart();
        let drafts =
            split_into_orders(&cart, &request(DeliveryOption::Delivery, Some("123 St"))).unwrap();

        assert_eq!(total_for(&drafts, a), Decimal::new(2500, 2));
        assert_eq!(total_for(&drafts, b), Decimal::new(1000, 2));
        assert_eq!(grand_total(&drafts), Decimal::new(3500, 2));
        let fees: Decimal = drafts.iter().map(|d| d.delivery_fee).sum();
        assert_eq!(fees, FLAT_DELIVERY_FEE * Decimal::from(2));
    }

    #[test]
    fn fee_does_not_scale_with_line_count() {
        let store = Uuid::new_v4();
        let cart = group_by_store(vec![
            line(store, Decimal::new(199, 2), 1),
            line(store, Decimal::new(250, 2), 3),
            line(store, Decimal::new(1, 0), 2),
        ])
        .unwrap();

        let drafts =
            split_into_orders(&cart, &request(DeliveryOption::Delivery, Some("Main St"))).unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].subtotal, Decimal::new(1149, 2));
        assert_eq!(drafts[0].total, Decimal::new(1649, 2));
        assert_eq!(drafts[0].items.len(), 3);
    }

    #[test]
    fn items_carry_the_price_snapshot() {
        let (a, _, cart) = two_store_cart();
        let drafts = split_into_orders(&cart, &request(DeliveryOption::Pickup, None)).unwrap();
        let draft = drafts.iter().find(|d| d.store_id == a).unwrap();

        assert_eq!(draft.items[0].price_at_purchase, Decimal::new(10, 0));
        assert_eq!(draft.items[0].quantity, 2);
    }

    #[test]
    fn delivery_requires_location() {
        let (_, _, cart) = two_store_cart();
        for location in [None, Some(""), Some("   ")] {
            let result = split_into_orders(&cart, &request(DeliveryOption::Delivery, location));
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn phone_number_is_required() {
        let (_, _, cart) = two_store_cart();
        let mut req = request(DeliveryOption::Pickup, None);
        req.phone_number = " ".into();
        assert!(matches!(
            split_into_orders(&cart, &req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn splitting_twice_yields_identical_drafts() {
        let (_, _, cart) = two_store_cart();
        let req = request(DeliveryOption::Delivery, Some("123 St"));
        assert_eq!(
            split_into_orders(&cart, &req).unwrap(),
            split_into_orders(&cart, &req).unwrap()
        );
    }
}
