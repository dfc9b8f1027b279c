use rust_decimal::Decimal;
use serde::Deserialize;

use super::parse_decimal;
use crate::{ExchangeError, FillDetails};

/// Row of `GET /api/v5/trade/fills`. A market order may execute as several
/// trades, each reported as its own row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FillRow {
    #[serde(default)]
    pub fill_sz: String,
    #[serde(default)]
    pub fill_px: String,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub fee_ccy: String,
}

/// Sums sizes and fees and size-weights the price across fill rows.
pub(crate) fn aggregate(rows: &[FillRow]) -> Result<FillDetails, ExchangeError> {
    let mut size = Decimal::ZERO;
    let mut notional = Decimal::ZERO;
    let mut fee = Decimal::ZERO;

    for row in rows {
        let fill_size = parse_decimal("fillSz", &row.fill_sz)?;
        let fill_price = parse_decimal("fillPx", &row.fill_px)?;

        size += fill_size;
        notional += fill_size * fill_price;
        fee += parse_decimal("fee", &row.fee)?;
    }

    if size.is_zero() {
        return Ok(FillDetails::default());
    }

    let fee_currency = rows
        .iter()
        .map(|row| row.fee_ccy.as_str())
        .find(|ccy| !ccy.is_empty())
        .unwrap_or_default()
        .to_string();

    Ok(FillDetails {
        size,
        price: notional / size,
        fee,
        fee_currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(fill_sz: &str, fill_px: &str, fee: &str, fee_ccy: &str) -> FillRow {
        FillRow {
            fill_sz: fill_sz.to_string(),
            fill_px: fill_px.to_string(),
            fee: fee.to_string(),
            fee_ccy: fee_ccy.to_string(),
        }
    }

    #[test]
    fn test_no_rows_is_default() {
        assert_eq!(aggregate(&[]).unwrap(), FillDetails::default());
    }

    #[test]
    fn test_single_row() {
        let fill = aggregate(&[row("0.0012", "66600", "-0.0000012", "BTC")]).unwrap();

        assert_eq!(fill.size, dec!(0.0012));
        assert_eq!(fill.price, dec!(66600));
        assert_eq!(fill.fee, dec!(-0.0000012));
        assert_eq!(fill.fee_currency, "BTC");
    }

    #[test]
    fn test_multiple_rows_weighted_price() {
        let fill = aggregate(&[
            row("0.001", "60000", "-0.000001", "BTC"),
            row("0.003", "64000", "-0.000003", "BTC"),
        ])
        .unwrap();

        assert_eq!(fill.size, dec!(0.004));
        assert_eq!(fill.price, dec!(63000));
        assert_eq!(fill.fee, dec!(-0.000004));
        assert_eq!(fill.fee_currency, "BTC");
    }

    #[test]
    fn test_zero_size_rows_are_unconfirmed() {
        let fill = aggregate(&[row("0", "", "", "")]).unwrap();
        assert!(!fill.is_confirmed());
    }

    #[test]
    fn test_invalid_number_propagates() {
        assert!(matches!(
            aggregate(&[row("abc", "1", "0", "BTC")]).unwrap_err(),
            ExchangeError::InvalidNumber { field: "fillSz", .. }
        ));
    }

    #[test]
    fn test_deserialize_okx_row() {
        let rows: Vec<FillRow> = serde_json::from_str(
            r#"[{"instId":"BTC-USDT","ordId":"1","fillSz":"0.0012","fillPx":"66600","fee":"-0.0000012","feeCcy":"BTC","side":"buy"}]"#,
        )
        .unwrap();

        assert_eq!(rows[0].fill_sz, "0.0012");
        assert_eq!(rows[0].fee_ccy, "BTC");
    }
}
