//! Enumeration types for constrained values.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FinTrackError;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// Suggested expense categories.
const EXPENSE_CATEGORIES: &[&str] = &["transport", "food", "education", "shopping"];
/// Suggested income categories.
const INCOME_CATEGORIES: &[&str] = &["salary", "business", "investment", "other"];

impl TransactionKind {
    /// Returns the lowercase wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Returns the suggested category vocabulary for this kind.
    ///
    /// Suggestions only; the ledger accepts any category label.
    #[inline]
    #[must_use]
    pub const fn suggested_categories(self) -> &'static [&'static str] {
        match self {
            Self::Income => INCOME_CATEGORIES,
            Self::Expense => EXPENSE_CATEGORIES,
        }
    }
}

impl fmt::Display for TransactionKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = FinTrackError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(FinTrackError::InvalidValue(format!(
                "unknown transaction kind `{s}` (expected income or expense)"
            ))),
        }
    }
}

/// Display currency. Only used for symbol lookup; amounts are never
/// converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Currency {
    /// United States dollar.
    #[serde(rename = "USD")]
    Usd,
    /// Pakistani rupee.
    #[default]
    #[serde(rename = "PKR")]
    Pkr,
}

impl Currency {
    /// Returns the ISO 4217 code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Pkr => "PKR",
        }
    }

    /// Returns the display symbol.
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Pkr => "\u{20a8}",
        }
    }
}

impl fmt::Display for Currency {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = FinTrackError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "PKR" => Ok(Self::Pkr),
            _ => Err(FinTrackError::InvalidValue(format!(
                "unsupported currency `{s}` (expected USD or PKR)"
            ))),
        }
    }
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the operating system.
    #[default]
    System,
}

impl ThemePreference {
    /// Returns the lowercase wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = FinTrackError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(FinTrackError::InvalidValue(format!(
                "unknown theme `{s}` (expected light, dark or system)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_kind_serde_lowercase() {
        let json = serde_json::to_string(&TransactionKind::Income).unwrap();
        assert_eq!(json, r#""income""#);
        let deserialized: TransactionKind = serde_json::from_str(r#""expense""#).unwrap();
        assert_eq!(deserialized, TransactionKind::Expense);
    }

    #[test]
    fn transaction_kind_parse_is_case_insensitive() {
        assert_eq!(
            "Income".parse::<TransactionKind>().unwrap(),
            TransactionKind::Income
        );
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn suggested_categories_differ_by_kind() {
        assert!(TransactionKind::Expense.suggested_categories().contains(&"food"));
        assert!(TransactionKind::Income.suggested_categories().contains(&"salary"));
        assert!(!TransactionKind::Income.suggested_categories().contains(&"food"));
    }

    #[test]
    fn currency_serde_uses_iso_code() {
        let json = serde_json::to_string(&Currency::Usd).unwrap();
        assert_eq!(json, r#""USD""#);
        let deserialized: Currency = serde_json::from_str(r#""PKR""#).unwrap();
        assert_eq!(deserialized, Currency::Pkr);
    }

    #[test]
    fn currency_symbols() {
        assert_eq!(Currency::Usd.symbol(), "$");
        assert_eq!(Currency::Pkr.symbol(), "\u{20a8}");
    }

    #[test]
    fn currency_default_is_pkr() {
        assert_eq!(Currency::default(), Currency::Pkr);
    }

    #[test]
    fn currency_parse() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn theme_serde_and_default() {
        assert_eq!(ThemePreference::default(), ThemePreference::System);
        let json = serde_json::to_string(&ThemePreference::Dark).unwrap();
        assert_eq!(json, r#""dark""#);
        assert_eq!(
            "LIGHT".parse::<ThemePreference>().unwrap(),
            ThemePreference::Light
        );
    }
}
