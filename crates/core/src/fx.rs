//! Exchange-rate conversion and multi-currency reconciliation.
//!
//! Aggregation policy: lines already in the display currency pass through
//! unrounded; cross-currency lines are converted and rounded **at the point
//! of conversion**, then accumulated (the historical per-line behavior,
//! preserved for compatibility). When no rate is available a cross-currency
//! line is *excluded* from the total and counted, never approximated at an
//! implicit 1:1.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Currency;

/// A validated USD→UZS multiplier (UZS per 1 USD).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    pub fn new(rate: f64) -> Result<Self, DomainError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DomainError::validation(format!(
                "exchange rate must be a positive number, got {rate}"
            )));
        }
        Ok(Self(rate))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// One amount tagged with its native currency, ready for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrencyLine {
    pub amount: f64,
    pub currency: Currency,
}

impl CurrencyLine {
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

/// Result of reconciling a set of lines into one display currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTotal {
    /// Sum of all convertible lines, in the display currency.
    pub total: f64,
    /// Number of lines excluded because no exchange rate was available.
    pub skipped: usize,
    pub currency: Currency,
}

/// Convert an amount between currencies, rounding to the target currency's
/// display precision. Same-currency conversion is the identity.
pub fn convert(amount: f64, from: Currency, to: Currency, rate: ExchangeRate) -> f64 {
    match (from, to) {
        (Currency::Usd, Currency::Uzs) => to.round(amount * rate.get()),
        (Currency::Uzs, Currency::Usd) => to.round(amount / rate.get()),
        _ => amount,
    }
}

/// Reconcile a collection of native-currency lines into a display-currency
/// total, excluding (and counting) lines that cannot be converted.
pub fn sum_in<I>(lines: I, display: Currency, rate: Option<ExchangeRate>) -> ReconciledTotal
where
    I: IntoIterator<Item = CurrencyLine>,
{
    let mut total = 0.0;
    let mut skipped = 0;

    for line in lines {
        if line.currency == display {
            total += line.amount;
        } else if let Some(rate) = rate {
            total += convert(line.amount, line.currency, display, rate);
        } else {
            skipped += 1;
        }
    }

    ReconciledTotal {
        total,
        skipped,
        currency: display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(v: f64) -> ExchangeRate {
        ExchangeRate::new(v).unwrap()
    }

    #[test]
    fn rate_must_be_positive_and_finite() {
        assert!(ExchangeRate::new(12500.0).is_ok());
        assert!(ExchangeRate::new(0.0).is_err());
        assert!(ExchangeRate::new(-1.0).is_err());
        assert!(ExchangeRate::new(f64::NAN).is_err());
    }

    #[test]
    fn convert_rounds_at_conversion_point() {
        // 0.15 USD * 12501 = 1875.15 → rounds to whole UZS units.
        assert_eq!(
            convert(0.15, Currency::Usd, Currency::Uzs, rate(12501.0)),
            1875.0
        );
        // UZS → USD rounds to cents.
        assert_eq!(
            convert(100_000.0, Currency::Uzs, Currency::Usd, rate(12500.0)),
            8.0
        );
        assert_eq!(
            convert(100_001.0, Currency::Uzs, Currency::Usd, rate(12500.0)),
            8.0
        );
    }

    #[test]
    fn mixed_lines_total_in_uzs() {
        // The canonical case: 100 USD @ 12500 + 200 000 UZS = 1 450 000 UZS.
        let lines = [
            CurrencyLine::new(100.0, Currency::Usd),
            CurrencyLine::new(200_000.0, Currency::Uzs),
        ];
        let out = sum_in(lines, Currency::Uzs, Some(rate(12500.0)));
        assert_eq!(out.total, 1_450_000.0);
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn missing_rate_excludes_cross_currency_lines() {
        let lines = [
            CurrencyLine::new(100.0, Currency::Usd),
            CurrencyLine::new(200_000.0, Currency::Uzs),
        ];
        let out = sum_in(lines, Currency::Uzs, None);
        assert_eq!(out.total, 200_000.0);
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn same_currency_lines_are_not_rounded() {
        // Raw accumulation keeps sub-unit precision for native lines.
        let lines = [
            CurrencyLine::new(10.4, Currency::Uzs),
            CurrencyLine::new(10.4, Currency::Uzs),
        ];
        let out = sum_in(lines, Currency::Uzs, None);
        assert_eq!(out.total, 20.8);
    }

    #[test]
    fn per_line_rounding_is_lossy_by_design() {
        // Two 0.06-USD lines at rate 12501: each converts to 750 (rounded
        // from 750.06), so the total is 1500, not round(1500.12).
        let lines = [
            CurrencyLine::new(0.06, Currency::Usd),
            CurrencyLine::new(0.06, Currency::Usd),
        ];
        let out = sum_in(lines, Currency::Uzs, Some(rate(12501.0)));
        assert_eq!(out.total, 1500.0);
    }

    #[test]
    fn total_in_usd_display() {
        let lines = [
            CurrencyLine::new(25_000.0, Currency::Uzs),
            CurrencyLine::new(3.5, Currency::Usd),
        ];
        let out = sum_in(lines, Currency::Usd, Some(rate(12500.0)));
        assert_eq!(out.total, 5.5);
        assert_eq!(out.skipped, 0);
    }
}
