use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::{Url, form_urlencoded};

use super::balance::{BalanceRow, find_available};
use super::envelope::parse_envelope;
use super::fills::{FillRow, aggregate};
use super::order::{OrderDetailsRow, PlaceOrderBody, PlaceOrderRow};
use super::{
    BALANCE_PATH, FILLS_PATH, ORDER_DETAILS_PATH, OkxAuthEnv, PLACE_ORDER_PATH, RequestSigner,
    parse_decimal,
};
use crate::{
    Balance, Exchange, ExchangeError, FillDetails, OrderHandle, OrderRequest, OrderState,
};

/// Authenticated OKX REST client.
#[derive(Debug, Clone)]
pub struct OkxClient {
    signer: RequestSigner,
    http: reqwest::Client,
    base_url: Url,
}

impl OkxClient {
    pub fn try_from_config(auth: OkxAuthEnv) -> Result<Self, ExchangeError> {
        let base_url = Url::parse(&auth.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(auth.request_timeout_secs))
            .build()?;
        let signer = RequestSigner::new(auth, http.clone(), base_url.clone());

        Ok(Self {
            signer,
            http,
            base_url,
        })
    }

    /// Signs and sends one request, returning the envelope's data rows.
    /// `request_path` includes the query string because it is part of the
    /// signed prehash.
    async fn send_signed<T: DeserializeOwned>(
        &self,
        action: &str,
        method: Method,
        request_path: &str,
        body: String,
    ) -> Result<Vec<T>, ExchangeError> {
        let headers = self.signer.headers(&method, request_path, &body).await?;
        let url = self.base_url.join(request_path)?;

        debug!("{action}: {method} {request_path}");

        let mut request = self.http.request(method, url).headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(ExchangeError::RequestFailed {
                action: action.to_string(),
                status,
                body: response_text,
            });
        }

        parse_envelope(action, &response_text)
    }
}

fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

fn first_row<T>(action: &str, rows: Vec<T>) -> Result<T, ExchangeError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| ExchangeError::MissingData {
            action: action.to_string(),
        })
}

#[async_trait]
impl Exchange for OkxClient {
    async fn place_market_order(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderHandle, ExchangeError> {
        const ACTION: &str = "place order";

        let body = serde_json::to_string(&PlaceOrderBody::from(request))?;
        info!(
            "Placing market {} on {}: {} {}",
            request.side(),
            request.instrument(),
            request.size(),
            request.settlement_currency()
        );

        let rows: Vec<PlaceOrderRow> = self
            .send_signed(ACTION, Method::POST, PLACE_ORDER_PATH, body)
            .await?;
        let row = first_row(ACTION, rows)?;

        if !row.is_accepted() {
            return Err(ExchangeError::Envelope {
                action: ACTION.to_string(),
                code: row.s_code,
                msg: row.s_msg,
            });
        }

        info!("Order {} accepted on {}", row.ord_id, request.instrument());

        Ok(OrderHandle {
            instrument: request.instrument().clone(),
            order_id: row.ord_id,
        })
    }

    async fn get_balance(&self, currency: &str) -> Result<Balance, ExchangeError> {
        let request_path = with_query(BALANCE_PATH, &[("ccy", currency)]);
        let rows: Vec<BalanceRow> = self
            .send_signed("get balance", Method::GET, &request_path, String::new())
            .await?;

        let available = match find_available(&rows, currency) {
            Some(raw) => parse_decimal("availBal", raw)?,
            None => {
                debug!("No {currency} entry in account balance, treating as zero");
                rust_decimal::Decimal::ZERO
            }
        };

        debug!("Available {currency} balance: {available}");

        Ok(Balance {
            currency: currency.to_string(),
            available,
        })
    }

    async fn get_order_status(&self, handle: &OrderHandle) -> Result<OrderState, ExchangeError> {
        const ACTION: &str = "get order status";

        let request_path = with_query(
            ORDER_DETAILS_PATH,
            &[
                ("instId", handle.instrument.as_str()),
                ("ordId", handle.order_id.as_str()),
            ],
        );
        let rows: Vec<OrderDetailsRow> = self
            .send_signed(ACTION, Method::GET, &request_path, String::new())
            .await?;
        let row = first_row(ACTION, rows)?;

        let state = OrderState::from_okx(&row.state);
        debug!("Order {} reported state '{}' ({state})", row.ord_id, row.state);

        Ok(state)
    }

    async fn get_fill_details(&self, order_id: &str) -> Result<FillDetails, ExchangeError> {
        let request_path = with_query(FILLS_PATH, &[("ordId", order_id)]);
        let rows: Vec<FillRow> = self
            .send_signed("get fills", Method::GET, &request_path, String::new())
            .await?;

        let fill = aggregate(&rows)?;
        debug!(
            "Order {order_id}: {} fill rows, size {} at {}",
            rows.len(),
            fill.size,
            fill.price
        );

        Ok(fill)
    }
}
