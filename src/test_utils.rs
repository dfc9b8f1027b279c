use async_trait::async_trait;
use dca_exchange::{
    Balance, Exchange, ExchangeError, FillDetails, OrderHandle, OrderRequest, OrderState,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One scripted answer. Queues repeat their last reply once drained, so a
/// single `Reply` scripts a permanent response.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    TransportError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PlaceOrder(OrderRequest),
    Balance(String),
    Status(String),
    Fills(String),
}

#[derive(Debug, Default)]
struct Script {
    placements: VecDeque<Reply<String>>,
    statuses: HashMap<String, VecDeque<Reply<OrderState>>>,
    fills: HashMap<String, VecDeque<Reply<FillDetails>>>,
    balances: HashMap<String, VecDeque<Reply<Decimal>>>,
    calls: Vec<Call>,
}

/// In-memory exchange that answers from scripted queues and records every
/// call it receives.
#[derive(Debug, Default)]
pub struct ScriptedExchange {
    script: Mutex<Script>,
}

fn transport_error(action: &str) -> ExchangeError {
    ExchangeError::RequestFailed {
        action: action.to_string(),
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "scripted failure".to_string(),
    }
}

fn next_reply<T: Clone>(queue: Option<&mut VecDeque<Reply<T>>>) -> Option<Reply<T>> {
    let queue = queue?;
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the next placement as `order_id`, which then answers status
    /// and fill queries from the given scripts.
    pub fn with_order(
        self,
        order_id: &str,
        statuses: Vec<Reply<OrderState>>,
        fills: Vec<Reply<FillDetails>>,
    ) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script
                .placements
                .push_back(Reply::Ok(order_id.to_string()));
            script
                .statuses
                .insert(order_id.to_string(), statuses.into());
            script.fills.insert(order_id.to_string(), fills.into());
        }
        self
    }

    pub fn with_failed_placement(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .placements
            .push_back(Reply::TransportError);
        self
    }

    pub fn with_balances(self, currency: &str, balances: Vec<Reply<Decimal>>) -> Self {
        self.script
            .lock()
            .unwrap()
            .balances
            .insert(currency.to_string(), balances.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PlaceOrder(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

pub fn fill(size: Decimal, price: Decimal, fee: Decimal, fee_currency: &str) -> FillDetails {
    FillDetails {
        size,
        price,
        fee,
        fee_currency: fee_currency.to_string(),
    }
}

#[async_trait]
impl Exchange for ScriptedExchange {
    async fn place_market_order(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderHandle, ExchangeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::PlaceOrder(request.clone()));

        match script.placements.pop_front() {
            Some(Reply::Ok(order_id)) => Ok(OrderHandle {
                instrument: request.instrument().clone(),
                order_id,
            }),
            Some(Reply::TransportError) | None => Err(transport_error("place order")),
        }
    }

    async fn get_balance(&self, currency: &str) -> Result<Balance, ExchangeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Balance(currency.to_string()));

        match next_reply(script.balances.get_mut(currency)) {
            Some(Reply::Ok(available)) => Ok(Balance {
                currency: currency.to_string(),
                available,
            }),
            Some(Reply::TransportError) => Err(transport_error("get balance")),
            None => Ok(Balance {
                currency: currency.to_string(),
                available: Decimal::ZERO,
            }),
        }
    }

    async fn get_order_status(&self, handle: &OrderHandle) -> Result<OrderState, ExchangeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Status(handle.order_id.clone()));

        match next_reply(script.statuses.get_mut(&handle.order_id)) {
            Some(Reply::Ok(state)) => Ok(state),
            Some(Reply::TransportError) | None => Err(transport_error("get order status")),
        }
    }

    async fn get_fill_details(&self, order_id: &str) -> Result<FillDetails, ExchangeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Fills(order_id.to_string()));

        match next_reply(script.fills.get_mut(order_id)) {
            Some(Reply::Ok(fill)) => Ok(fill),
            Some(Reply::TransportError) => Err(transport_error("get fills")),
            None => Ok(FillDetails::default()),
        }
    }
}
