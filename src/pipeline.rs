use chrono::{DateTime, Utc};
use dca_exchange::{Exchange, ExchangeError, FillDetails, InstrumentId, OrderRequest, OrderState, Side};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;
use tracing::{error, info, warn};

use crate::executor::{LegExecution, OrderExecutor};

/// Decimal places accepted for the leg-two order size.
pub const LEG_TWO_SIZE_DP: u32 = 6;

/// The three currencies of a purchase and the two instruments that connect
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruments {
    pub fiat_currency: String,
    pub stable_currency: String,
    pub crypto_asset: String,
    /// Stablecoin quoted in fiat, bought with fiat in leg one.
    pub fiat_pair: InstrumentId,
    /// Crypto asset quoted in the stablecoin, bought with the stablecoin in
    /// leg two.
    pub crypto_pair: InstrumentId,
}

impl Instruments {
    pub fn new(fiat_currency: &str, stable_currency: &str, crypto_asset: &str) -> Self {
        Self {
            fiat_currency: fiat_currency.to_string(),
            stable_currency: stable_currency.to_string(),
            crypto_asset: crypto_asset.to_string(),
            fiat_pair: InstrumentId::from_currencies(stable_currency, fiat_currency),
            crypto_pair: InstrumentId::from_currencies(crypto_asset, stable_currency),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    FiatToStable,
    StableToCrypto,
}

impl Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FiatToStable => write!(f, "leg 1 (fiat to stablecoin)"),
            Self::StableToCrypto => write!(f, "leg 2 (stablecoin to crypto)"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{leg} order was not placed: {source}")]
    Placement {
        leg: Leg,
        #[source]
        source: ExchangeError,
    },
    #[error("{leg} order {order_id} ended {state} without a fill")]
    Unfilled {
        leg: Leg,
        order_id: String,
        state: OrderState,
    },
    #[error("{leg} order {order_id} not confirmed after {attempts} attempts (last state {state})")]
    NotConfirmed {
        leg: Leg,
        order_id: String,
        state: OrderState,
        attempts: u32,
    },
    #[error("Failed to read {currency} balance: {source}")]
    Balance {
        currency: String,
        #[source]
        source: ExchangeError,
    },
    #[error("{currency} balance {available} is too small to size the next order")]
    InsufficientBalance { currency: String, available: Decimal },
}

impl PipelineError {
    /// The leg whose execution failed, if the failure belongs to one.
    pub const fn leg(&self) -> Option<Leg> {
        match self {
            Self::Placement { leg, .. }
            | Self::Unfilled { leg, .. }
            | Self::NotConfirmed { leg, .. } => Some(*leg),
            Self::Balance { .. } | Self::InsufficientBalance { .. } => None,
        }
    }
}

/// Balance reads taken around the two legs. Snapshots that could not be
/// read are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshots {
    pub initial_fiat: Option<Decimal>,
    pub final_fiat: Option<Decimal>,
    pub initial_crypto: Option<Decimal>,
    pub final_crypto: Option<Decimal>,
    pub stable_after_leg_one: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub crypto_pair: InstrumentId,
    pub side: Side,
    pub leg_one: FillDetails,
    pub leg_two: FillDetails,
    pub leg_two_order_id: String,
    pub balances: BalanceSnapshots,
    pub completed_at: DateTime<Utc>,
}

/// Leg-two size: the stablecoin balance truncated to the accepted precision
/// so the order never asks for more than is available.
pub fn leg_two_size(available: Decimal) -> Decimal {
    available
        .round_dp_with_strategy(LEG_TWO_SIZE_DP, RoundingStrategy::ToZero)
        .normalize()
}

pub struct TradePipeline<'a, E: Exchange> {
    exchange: &'a E,
    instruments: Instruments,
    buy_amount: Decimal,
    executor: OrderExecutor,
}

impl<'a, E: Exchange> TradePipeline<'a, E> {
    pub const fn new(
        exchange: &'a E,
        instruments: Instruments,
        buy_amount: Decimal,
        executor: OrderExecutor,
    ) -> Self {
        Self {
            exchange,
            instruments,
            buy_amount,
            executor,
        }
    }

    /// Runs leg one then leg two. Nothing is unwound on failure: stablecoin
    /// bought in leg one stays in the account when leg two does not
    /// complete.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let instruments = &self.instruments;

        let initial_fiat = self.snapshot(&instruments.fiat_currency).await;

        info!(
            "Buying {} with {} {}",
            instruments.stable_currency, self.buy_amount, instruments.fiat_currency
        );
        let leg_one_request = OrderRequest::market(
            instruments.fiat_pair.clone(),
            Side::Buy,
            instruments.fiat_currency.as_str(),
            self.buy_amount,
        );
        let (_, leg_one) = self
            .execute_leg(Leg::FiatToStable, &leg_one_request)
            .await?;

        let final_fiat = self.snapshot(&instruments.fiat_currency).await;
        let initial_crypto = self.snapshot(&instruments.crypto_asset).await;

        let stable_after_leg_one = self
            .exchange
            .get_balance(&instruments.stable_currency)
            .await
            .map_err(|source| PipelineError::Balance {
                currency: instruments.stable_currency.clone(),
                source,
            })?
            .available;

        let size = leg_two_size(stable_after_leg_one);
        if size <= Decimal::ZERO {
            return Err(PipelineError::InsufficientBalance {
                currency: instruments.stable_currency.clone(),
                available: stable_after_leg_one,
            });
        }

        info!(
            "Buying {} with {size} {}",
            instruments.crypto_asset, instruments.stable_currency
        );
        let leg_two_request = OrderRequest::market(
            instruments.crypto_pair.clone(),
            Side::Buy,
            instruments.stable_currency.as_str(),
            size,
        );
        let (leg_two_order_id, leg_two) = self
            .execute_leg(Leg::StableToCrypto, &leg_two_request)
            .await?;

        let final_crypto = self.snapshot(&instruments.crypto_asset).await;

        Ok(PipelineReport {
            crypto_pair: instruments.crypto_pair.clone(),
            side: leg_two_request.side(),
            leg_one,
            leg_two,
            leg_two_order_id,
            balances: BalanceSnapshots {
                initial_fiat,
                final_fiat,
                initial_crypto,
                final_crypto,
                stable_after_leg_one,
            },
            completed_at: Utc::now(),
        })
    }

    async fn execute_leg(
        &self,
        leg: Leg,
        request: &OrderRequest,
    ) -> Result<(String, FillDetails), PipelineError> {
        let execution = self
            .executor
            .execute(self.exchange, request)
            .await
            .map_err(|source| {
                error!("Failed to place {leg} order: {source}");
                PipelineError::Placement { leg, source }
            })?;

        match execution {
            LegExecution::Confirmed { handle, state, fill } => {
                info!(
                    "{leg} order {} {state}: {} {} at {}",
                    handle.order_id,
                    fill.size,
                    request.instrument(),
                    fill.price
                );
                Ok((handle.order_id, fill))
            }
            LegExecution::Rejected { handle, state } => Err(PipelineError::Unfilled {
                leg,
                order_id: handle.order_id,
                state,
            }),
            LegExecution::Exhausted {
                handle,
                last_state,
                attempts,
            } => Err(PipelineError::NotConfirmed {
                leg,
                order_id: handle.order_id,
                state: last_state,
                attempts,
            }),
        }
    }

    async fn snapshot(&self, currency: &str) -> Option<Decimal> {
        match self.exchange.get_balance(currency).await {
            Ok(balance) => {
                info!("{currency} balance: {}", balance.available);
                Some(balance.available)
            }
            Err(e) => {
                warn!("Could not read {currency} balance: {e}");
                None
            }
        }
    }
}
