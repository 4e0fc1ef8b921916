use paylane_core::gateway::{Level3Data, Level3LineItem};
use paylane_core::order::{LineItem, OrderId, ShippingInfo};

use crate::settings::GatewaySettings;

/// Build the level-3 payload for a capture request.
///
/// Only US merchant accounts send level-3 data; everyone else gets
/// `None`. Zips are only attached when they are valid US zip codes, so a
/// US account shipping abroad still sends the line items.
pub fn build(
    settings: &GatewaySettings,
    order: OrderId,
    items: &[LineItem],
    shipping: &ShippingInfo,
) -> Option<Level3Data> {
    if settings.account_country != "US" {
        return None;
    }

    let line_items = items.iter().map(level3_line).collect();

    let shipping_address_zip = shipping
        .postcode
        .as_deref()
        .filter(|zip| is_us_zip(zip))
        .map(str::to_string);

    let shipping_from_zip = settings
        .store_postcode
        .as_deref()
        .filter(|zip| is_us_zip(zip))
        .map(str::to_string);

    Some(Level3Data {
        merchant_reference: order.to_string(),
        shipping_amount: shipping.total_minor + shipping.tax_minor,
        line_items,
        shipping_address_zip,
        shipping_from_zip,
    })
}

fn level3_line(item: &LineItem) -> Level3LineItem {
    let quantity = item.quantity.max(1);
    Level3LineItem {
        product_code: match item.product_id {
            Some(id) => id.to_string(),
            None => "fee".to_string(),
        },
        product_description: item.name.clone(),
        unit_cost: item.subtotal_minor / i64::from(quantity),
        quantity: item.quantity,
        tax_amount: item.tax_minor,
        discount_amount: item.subtotal_minor - item.total_minor,
    }
}

/// `12345` or `12345-6789`.
fn is_us_zip(zip: &str) -> bool {
    let bytes = zip.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}
