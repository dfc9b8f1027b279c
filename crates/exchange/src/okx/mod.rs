use rust_decimal::Decimal;

use crate::ExchangeError;

pub mod auth;
mod balance;
pub mod client;
mod envelope;
mod fills;
mod order;
pub mod signer;

pub use auth::OkxAuthEnv;
pub use client::OkxClient;
pub use signer::RequestSigner;

pub(crate) const SERVER_TIME_PATH: &str = "/api/v5/public/time";
pub(crate) const PLACE_ORDER_PATH: &str = "/api/v5/trade/order";
pub(crate) const ORDER_DETAILS_PATH: &str = "/api/v5/trade/order";
pub(crate) const BALANCE_PATH: &str = "/api/v5/account/balance";
pub(crate) const FILLS_PATH: &str = "/api/v5/trade/fills";

/// OKX encodes every amount as a string and uses `""` for "not yet known".
pub(crate) fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, ExchangeError> {
    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }

    value
        .parse::<Decimal>()
        .map_err(|_| ExchangeError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("availBal", "79.92").unwrap(), dec!(79.92));
        assert_eq!(parse_decimal("fee", "-0.0798").unwrap(), dec!(-0.0798));
        assert_eq!(parse_decimal("fillSz", "").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        let err = parse_decimal("fillPx", "n/a").unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::InvalidNumber { field: "fillPx", ref value } if value == "n/a"
        ));
    }
}
