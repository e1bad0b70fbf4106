use regex::Regex;
use std::sync::LazyLock;

use crate::CrmError;

static CURRENCY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

/// Monetary amounts are stored as integer cents and must be non-negative.
pub fn validate_amount_cents(amount_cents: i64) -> Result<(), CrmError> {
    if amount_cents < 0 {
        return Err(CrmError::Validation(
            "Amount cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

/// ISO 4217 alpha code, e.g. "USD".
pub fn validate_currency(currency: &str) -> Result<(), CrmError> {
    if !CURRENCY_REGEX.is_match(currency) {
        return Err(CrmError::Validation(
            "Currency must be a 3-letter uppercase code".to_owned(),
        ));
    }
    Ok(())
}
