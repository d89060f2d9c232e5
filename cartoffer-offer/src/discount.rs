use cartoffer_core::Discount;

/// Cart value after applying `discount` to `cart_value`.
///
/// The result always lies in `[0, cart_value]`: negative carts count as empty,
/// negative discount values leave the cart unchanged, flat amounts larger than
/// the cart bottom out at zero and percentages are capped at 100. Percentages
/// truncate toward zero.
pub fn discounted_value(cart_value: i64, discount: &Discount) -> i64 {
    let cart = cart_value.max(0);

    let result = match *discount {
        Discount::FlatX(amount) => cart.saturating_sub(amount.max(0)),
        Discount::FlatPercent(percent) => {
            let keep = 100 - i128::from(percent.clamp(0, 100));
            // i128 so cart * keep cannot overflow
            (i128::from(cart) * keep / 100) as i64
        }
    };

    result.clamp(0, cart)
}
