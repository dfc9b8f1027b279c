use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Display;

pub mod error;
pub mod okx;
pub mod order;

pub use error::ExchangeError;
pub use okx::{OkxAuthEnv, OkxClient};
pub use order::{Balance, FillDetails, OrderHandle, OrderRequest, OrderState};

/// Exchange instrument identifier in `BASE-QUOTE` form, e.g. `BTC-USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn from_currencies(base: &str, quote: &str) -> Self {
        Self(format!("{base}-{quote}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSideError(String);

impl std::fmt::Display for InvalidSideError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid side: {}", self.0)
    }
}

impl std::error::Error for InvalidSideError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = InvalidSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(InvalidSideError(s.to_string())),
        }
    }
}

/// Authenticated operations the purchase pipeline needs from an exchange.
///
/// Every operation reports failure through [`ExchangeError`] so that a
/// failed query is never confused with a legitimate zero or empty result.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn place_market_order(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderHandle, ExchangeError>;

    /// Available balance for `currency`. A currency the account does not
    /// hold is reported as a zero balance, not as an error.
    async fn get_balance(&self, currency: &str) -> Result<Balance, ExchangeError>;

    async fn get_order_status(&self, handle: &OrderHandle) -> Result<OrderState, ExchangeError>;

    /// Aggregated fills for an order. Returns the all-zero default while the
    /// exchange has not published a fill row yet.
    async fn get_fill_details(&self, order_id: &str) -> Result<FillDetails, ExchangeError>;
}
