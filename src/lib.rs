use dca_exchange::OkxClient;
use tracing::{error, info, warn};

pub mod env;
pub mod executor;
pub mod pipeline;
pub mod recorder;

#[cfg(test)]
pub mod test_utils;

pub use crate::env::Env;
use crate::executor::OrderExecutor;
use crate::pipeline::{Leg, TradePipeline};
use crate::recorder::{JsonFileSink, TradeRecorder};

/// Runs one two-leg purchase and writes its trade record.
pub async fn run(env: Env) -> anyhow::Result<()> {
    let instruments = env.instruments.instruments();
    let policy = env.poll_policy();

    info!(
        "Starting purchase: {} {} -> {} -> {} (polling every {:?}, at most {} attempts per order)",
        env.buy_amount,
        instruments.fiat_currency,
        instruments.stable_currency,
        instruments.crypto_asset,
        policy.interval,
        policy.max_attempts
    );

    let client = OkxClient::try_from_config(env.okx_auth.clone())?;
    let pipeline = TradePipeline::new(
        &client,
        instruments,
        env.buy_amount,
        OrderExecutor::new(policy),
    );

    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Purchase aborted: {e}");
            if e.leg() == Some(Leg::StableToCrypto) {
                warn!("Leg 1 proceeds remain in the stablecoin balance");
            }
            return Err(e.into());
        }
    };

    let recorder = TradeRecorder::new(JsonFileSink::new(&env.trade_log_path), env.report_timezone);
    let record = recorder.record(&report).await?;

    info!(
        "Purchase complete: {} {} at {} (cost {}, fee {} {})",
        record.trade_amount,
        record.trading_pair,
        record.trade_price,
        record.total_usd_cost,
        record.fee_cost,
        record.fee_currency
    );

    Ok(())
}
