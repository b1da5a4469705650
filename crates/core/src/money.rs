//! Currencies, amount parsing and display formatting.
//!
//! Amounts are plain `f64` values in their **native** currency; the native
//! currency of a line is sticky and conversion only ever happens at
//! display/aggregation time (see [`crate::fx`]). Rounding convention:
//! UZS-style local amounts round to whole units, USD-style foreign amounts
//! round to two decimals.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Currency of an amount or line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Uzbek so'm, the local currency, displayed in whole units.
    Uzs,
    /// US dollar, the foreign currency, displayed with two decimals.
    Usd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Uzs => "UZS",
            Currency::Usd => "USD",
        }
    }

    /// Round an amount to this currency's display precision.
    pub fn round(self, amount: f64) -> f64 {
        match self {
            Currency::Uzs => amount.round(),
            Currency::Usd => (amount * 100.0).round() / 100.0,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UZS" => Ok(Currency::Uzs),
            "USD" => Ok(Currency::Usd),
            other => Err(DomainError::validation(format!(
                "unknown currency '{other}' (expected UZS or USD)"
            ))),
        }
    }
}

/// Parse a user-entered amount string into an `f64`.
///
/// Deliberately forgiving (the historical inputs were hand-typed): strips
/// grouping spaces and apostrophes, accepts either `.` or a lone `,` as the
/// decimal separator, accepts `1,234.56`-style comma grouping.
pub fn parse_amount(input: &str) -> Result<f64, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("amount is empty"));
    }

    let mut cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '_')
        .collect();

    // A comma is a decimal separator only when no dot is present; otherwise
    // it is thousands grouping.
    if cleaned.contains(',') {
        if cleaned.contains('.') {
            cleaned.retain(|c| c != ',');
        } else if cleaned.matches(',').count() == 1 {
            cleaned = cleaned.replace(',', ".");
        } else {
            cleaned.retain(|c| c != ',');
        }
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| DomainError::validation(format!("'{trimmed}' is not a number")))?;

    if !value.is_finite() {
        return Err(DomainError::validation("amount must be finite"));
    }

    Ok(value)
}

/// Format an amount for display: grouped integer digits, currency-precision
/// decimals, and the currency code suffix (e.g. `1 450 000 UZS`, `10.50 USD`).
pub fn format_amount(amount: f64, currency: Currency) -> String {
    let rounded = currency.round(amount);
    let negative = rounded < 0.0;
    let abs = rounded.abs();

    let (int_part, frac) = match currency {
        Currency::Uzs => (abs as i64, None),
        Currency::Usd => {
            let cents = (abs * 100.0).round() as i64;
            (cents / 100, Some(cents % 100))
        }
    };

    let digits = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f:02} {}", currency.code()),
        None => format!("{sign}{grouped} {}", currency.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_round_policy() {
        assert_eq!(Currency::Uzs.round(1249.6), 1250.0);
        assert_eq!(Currency::Uzs.round(1249.4), 1249.0);
        assert_eq!(Currency::Usd.round(10.005), 10.01);
        assert_eq!(Currency::Usd.round(10.004), 10.0);
    }

    #[test]
    fn currency_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Currency::Uzs).unwrap(), "\"UZS\"");
        assert_eq!(
            serde_json::from_str::<Currency>("\"USD\"").unwrap(),
            Currency::Usd
        );
    }

    #[test]
    fn parse_plain_and_grouped() {
        assert_eq!(parse_amount("12500").unwrap(), 12500.0);
        assert_eq!(parse_amount("12 500").unwrap(), 12500.0);
        assert_eq!(parse_amount("1'250'000").unwrap(), 1_250_000.0);
        assert_eq!(parse_amount("1,234.56").unwrap(), 1234.56);
    }

    #[test]
    fn parse_comma_decimal() {
        assert_eq!(parse_amount("12,5").unwrap(), 12.5);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn format_uzs_whole_units() {
        assert_eq!(format_amount(1_450_000.0, Currency::Uzs), "1 450 000 UZS");
        assert_eq!(format_amount(999.0, Currency::Uzs), "999 UZS");
        assert_eq!(format_amount(-1500.4, Currency::Uzs), "-1 500 UZS");
    }

    #[test]
    fn format_usd_two_decimals() {
        assert_eq!(format_amount(10.5, Currency::Usd), "10.50 USD");
        assert_eq!(format_amount(1234.0, Currency::Usd), "1 234.00 USD");
    }
}
