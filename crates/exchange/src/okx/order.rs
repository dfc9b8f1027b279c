use serde::{Deserialize, Serialize};

use crate::{OrderRequest, Side};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TradeMode {
    Cash,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OrderType {
    Market,
}

/// Body of `POST /api/v5/trade/order`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceOrderBody<'a> {
    pub inst_id: &'a str,
    pub td_mode: TradeMode,
    pub side: Side,
    pub ord_type: OrderType,
    pub ccy: &'a str,
    pub sz: &'a str,
}

impl<'a> From<&'a OrderRequest> for PlaceOrderBody<'a> {
    fn from(request: &'a OrderRequest) -> Self {
        Self {
            inst_id: request.instrument().as_str(),
            td_mode: TradeMode::Cash,
            side: request.side(),
            ord_type: OrderType::Market,
            ccy: request.settlement_currency(),
            sz: request.size(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceOrderRow {
    #[serde(default)]
    pub ord_id: String,
    #[serde(default)]
    pub s_code: String,
    #[serde(default)]
    pub s_msg: String,
}

impl PlaceOrderRow {
    pub(crate) fn is_accepted(&self) -> bool {
        (self.s_code.is_empty() || self.s_code == "0") && !self.ord_id.is_empty()
    }
}

/// Row of `GET /api/v5/trade/order`. Only the lifecycle state is consumed;
/// execution figures come from the fills endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderDetailsRow {
    #[serde(default)]
    pub ord_id: String,
    pub state: String,
}
