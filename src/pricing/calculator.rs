use rust_decimal::Decimal;

/// Largest amount a stored price column (`NUMERIC(12, 2)`) holds: 9,999,999,999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Arithmetic for line, order and component prices
pub struct PriceCalculator;

impl PriceCalculator {
    /// Calculate the total of one priced line
    ///
    /// # Arguments
    /// * `quantity` - Number of units on the line
    /// * `unit_price` - Resolved price of one unit
    ///
    /// # Returns
    /// Line total as Decimal (unit_price * quantity)
    pub fn calculate_subtotal(quantity: i32, unit_price: Decimal) -> Decimal {
        unit_price * Decimal::from(quantity)
    }

    /// Calculate the total price of an order
    ///
    /// # Arguments
    /// * `subtotals` - Line totals of every item in the order
    ///
    /// # Returns
    /// Sum of all line totals
    pub fn calculate_total(subtotals: &[Decimal]) -> Decimal {
        subtotals.iter().sum()
    }

    /// Final price after a flat discount; the result is not clamped at zero
    ///
    /// # Returns
    /// `None` when the subtraction overflows
    pub fn calculate_final(total: Decimal, discount_amount: Decimal) -> Option<Decimal> {
        total.checked_sub(discount_amount)
    }

    /// Whether an amount survives storage unchanged: at most cents, within `MAX_AMOUNT`
    pub fn is_storable(amount: Decimal) -> bool {
        amount.normalize().scale() <= 2 && amount.abs() <= MAX_AMOUNT
    }

    /// Sum independently resolved component prices into one item price
    pub fn sum_components<I>(prices: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        prices.into_iter().sum()
    }

    /// Unit price of an addon line: base addon price plus optional option surcharge
    pub fn addon_unit_price(base: Decimal, option_surcharge: Option<Decimal>) -> Decimal {
        base + option_surcharge.unwrap_or(Decimal::ZERO)
    }
}
