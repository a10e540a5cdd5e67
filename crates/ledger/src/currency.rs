use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Currency an account is denominated in.
///
/// Balances and amounts are always stored as `i64` **minor units** (cents,
/// pence, fen). The ledger never converts between currencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Rmb,
    Gbp,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Rmb, Currency::Gbp, Currency::Eur];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Rmb => "RMB",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "RMB" => Ok(Currency::Rmb),
            "GBP" => Ok(Currency::Gbp),
            "EUR" => Ok(Currency::Eur),
            other => Err(LedgerError::CurrencyMismatch(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

impl core::str::FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}
