use rust_decimal::Decimal;

use crate::{InstrumentId, Side};

pub mod state;

pub use state::OrderState;

/// A market order as submitted to the exchange. Immutable once built; the
/// size is already formatted the way the exchange expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    instrument: InstrumentId,
    side: Side,
    settlement_currency: String,
    size: String,
}

impl OrderRequest {
    pub fn market(
        instrument: InstrumentId,
        side: Side,
        settlement_currency: impl Into<String>,
        size: Decimal,
    ) -> Self {
        Self {
            instrument,
            side,
            settlement_currency: settlement_currency.into(),
            size: size.normalize().to_string(),
        }
    }

    pub const fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub fn settlement_currency(&self) -> &str {
        &self.settlement_currency
    }

    pub fn size(&self) -> &str {
        &self.size
    }
}

/// Key for every status and fill query after placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHandle {
    pub instrument: InstrumentId,
    pub order_id: String,
}

/// Executed size, price and fee of an order, all zero until a fill exists.
///
/// `fee` keeps the exchange's sign convention (negative means charged).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillDetails {
    pub size: Decimal,
    pub price: Decimal,
    pub fee: Decimal,
    pub fee_currency: String,
}

impl FillDetails {
    pub fn is_confirmed(&self) -> bool {
        self.size > Decimal::ZERO
    }

    pub fn fee_magnitude(&self) -> Decimal {
        self.fee.abs()
    }

    /// Quote-currency value of the fill.
    pub fn notional(&self) -> Decimal {
        self.size * self.price
    }
}

/// Point-in-time available balance of one currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub currency: String,
    pub available: Decimal,
}
