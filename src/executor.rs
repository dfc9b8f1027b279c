use backon::{ConstantBuilder, Retryable};
use dca_exchange::{Exchange, ExchangeError, FillDetails, OrderHandle, OrderRequest, OrderState};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Fixed-interval polling budget shared by the status and fill checks of
/// one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 15,
        }
    }
}

impl PollPolicy {
    /// Upper bound on the time one order spends sleeping between polls.
    pub fn max_wait(self) -> Duration {
        self.interval * self.max_attempts
    }

    fn backoff(self) -> ConstantBuilder {
        let retries = usize::try_from(self.max_attempts.saturating_sub(1)).unwrap_or(usize::MAX);

        ConstantBuilder::default()
            .with_delay(self.interval)
            .with_max_times(retries)
    }
}

/// How a placed order's polling ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegExecution {
    /// Filled or partially filled, with a non-zero filled size reported.
    Confirmed {
        handle: OrderHandle,
        state: OrderState,
        fill: FillDetails,
    },
    /// Canceled or failed on the exchange.
    Rejected {
        handle: OrderHandle,
        state: OrderState,
    },
    /// Attempt budget spent before a confirmed fill was observed.
    Exhausted {
        handle: OrderHandle,
        last_state: OrderState,
        attempts: u32,
    },
}

impl LegExecution {
    pub const fn handle(&self) -> &OrderHandle {
        match self {
            Self::Confirmed { handle, .. }
            | Self::Rejected { handle, .. }
            | Self::Exhausted { handle, .. } => handle,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum PollError {
    #[error("order is {0}")]
    Pending(OrderState),
    #[error("order is {0} but no fill has been reported")]
    AwaitingFill(OrderState),
    #[error("order ended {0}")]
    Terminal(OrderState),
}

impl PollError {
    const fn should_retry(&self) -> bool {
        !matches!(self, Self::Terminal(_))
    }
}

/// Places a market order and polls it until it is confirmed filled, ends
/// without a fill, or the attempt budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct OrderExecutor {
    policy: PollPolicy,
}

impl OrderExecutor {
    pub const fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Only placement failures are errors. Everything after placement is
    /// reported through [`LegExecution`].
    pub async fn execute<E: Exchange>(
        &self,
        exchange: &E,
        request: &OrderRequest,
    ) -> Result<LegExecution, ExchangeError> {
        let handle = exchange.place_market_order(request).await?;
        Ok(self.await_fill(exchange, handle).await)
    }

    pub async fn await_fill<E: Exchange>(&self, exchange: &E, handle: OrderHandle) -> LegExecution {
        let state = Mutex::new(OrderState::Unknown);
        let attempts = AtomicU32::new(0);

        debug!(
            "Polling order {} every {:?}, at most {} attempts",
            handle.order_id, self.policy.interval, self.policy.max_attempts
        );

        tokio::time::sleep(self.policy.interval).await;

        let poll = {
            let (state, attempts, handle) = (&state, &attempts, &handle);
            move || async move {
                attempts.fetch_add(1, Ordering::Relaxed);
                poll_once(exchange, handle, state).await
            }
        };

        let result = poll
            .retry(self.policy.backoff())
            .when(PollError::should_retry)
            .notify(|err, delay| {
                debug!(
                    "Order {} not confirmed yet ({err}), polling again in {delay:?}",
                    handle.order_id
                );
            })
            .await;

        match result {
            Ok(fill) => {
                info!(
                    "Order {} confirmed: {} at {} (fee {} {})",
                    handle.order_id, fill.size, fill.price, fill.fee, fill.fee_currency
                );
                LegExecution::Confirmed {
                    handle,
                    state: state.into_inner(),
                    fill,
                }
            }
            Err(PollError::Terminal(state)) => {
                warn!("Order {} ended {state} without a fill", handle.order_id);
                LegExecution::Rejected { handle, state }
            }
            Err(PollError::Pending(last_state) | PollError::AwaitingFill(last_state)) => {
                let attempts = attempts.into_inner();
                warn!(
                    "Order {} still {last_state} after {attempts} attempts",
                    handle.order_id
                );
                LegExecution::Exhausted {
                    handle,
                    last_state,
                    attempts,
                }
            }
        }
    }
}

/// One attempt: refresh the status until it reports a fill, then look for
/// the fill rows in the same attempt. A filled status can be published
/// before the fill rows, so a zero filled size keeps the order unconfirmed.
async fn poll_once<E: Exchange>(
    exchange: &E,
    handle: &OrderHandle,
    state: &Mutex<OrderState>,
) -> Result<FillDetails, PollError> {
    let mut state = state.lock().await;

    if !state.has_fill() {
        let current = match exchange.get_order_status(handle).await {
            Ok(current) => current,
            Err(e) => {
                warn!("Status query for order {} failed: {e}", handle.order_id);
                OrderState::Unknown
            }
        };
        *state = current;

        if current.is_terminal_failure() {
            return Err(PollError::Terminal(current));
        }

        if !current.has_fill() {
            return Err(PollError::Pending(current));
        }

        info!("Order {} reported {current}", handle.order_id);
    }

    match exchange.get_fill_details(&handle.order_id).await {
        Ok(fill) if fill.is_confirmed() => Ok(fill),
        Ok(_) => Err(PollError::AwaitingFill(*state)),
        Err(e) => {
            warn!("Fill query for order {} failed: {e}", handle.order_id);
            Err(PollError::AwaitingFill(*state))
        }
    }
}
