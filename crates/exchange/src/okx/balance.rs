use serde::Deserialize;

/// Row of `GET /api/v5/account/balance`: one per account, each holding a
/// `details` entry per currency.
#[derive(Debug, Deserialize)]
pub(crate) struct BalanceRow {
    #[serde(default)]
    pub details: Vec<BalanceDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BalanceDetail {
    pub ccy: String,
    #[serde(default)]
    pub avail_bal: String,
}

/// Raw `availBal` for `currency`, or `None` when the account does not hold it.
pub(crate) fn find_available<'a>(rows: &'a [BalanceRow], currency: &str) -> Option<&'a str> {
    rows.iter()
        .flat_map(|row| row.details.iter())
        .find(|detail| detail.ccy == currency)
        .map(|detail| detail.avail_bal.as_str())
}
