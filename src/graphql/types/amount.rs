use async_graphql::SimpleObject;

/// A monetary amount
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct Amount {
    /// Amount in the currency's main unit
    pub value: f64,
    pub currency: String,
    pub value_in_cents: i64,
}

impl Amount {
    pub fn from_cents(cents: i64, currency: &str) -> Self {
        Self {
            value: cents as f64 / 100.0,
            currency: currency.to_string(),
            value_in_cents: cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_are_converted() {
        let amount = Amount::from_cents(1250, "EUR");
        assert_eq!(amount.value, 12.5);
        assert_eq!(amount.value_in_cents, 1250);
        assert_eq!(amount.currency, "EUR");
    }
}
