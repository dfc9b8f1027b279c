use async_trait::async_trait;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::pipeline::PipelineReport;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PRICE_DP: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Failed to write trade record: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize trade record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Final record of one purchase, built from the leg-two fill and the
/// balance snapshots. Unreadable balances serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRecord {
    pub timestamp: String,
    pub trading_pair: String,
    pub side: String,
    pub trade_price: Decimal,
    pub trade_amount: Decimal,
    pub total_usd_cost: Decimal,
    pub fee_cost: Decimal,
    pub fee_currency: String,
    pub initial_fiat_balance: Option<Decimal>,
    pub final_fiat_balance: Option<Decimal>,
    pub initial_crypto_asset_balance: Option<Decimal>,
    pub final_crypto_asset_balance: Option<Decimal>,
}

impl TradeRecord {
    pub fn from_report(report: &PipelineReport, timezone: Tz) -> Self {
        let fill = &report.leg_two;
        let balances = &report.balances;

        Self {
            timestamp: report
                .completed_at
                .with_timezone(&timezone)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            trading_pair: report.crypto_pair.to_string(),
            side: report.side.to_string(),
            trade_price: fill.price.round_dp(PRICE_DP).normalize(),
            trade_amount: fill.size.normalize(),
            total_usd_cost: fill.notional().round_dp(PRICE_DP).normalize(),
            fee_cost: fill.fee_magnitude().normalize(),
            fee_currency: fill.fee_currency.clone(),
            initial_fiat_balance: balances.initial_fiat,
            final_fiat_balance: balances.final_fiat,
            initial_crypto_asset_balance: balances.initial_crypto,
            final_crypto_asset_balance: balances.final_crypto,
        }
    }

    /// Columns in the order the spreadsheet appender writes them.
    pub fn spreadsheet_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.trading_pair.clone(),
            self.side.clone(),
            self.trade_price.to_string(),
            self.trade_amount.to_string(),
            self.total_usd_cost.to_string(),
            self.fee_cost.to_string(),
            self.fee_currency.clone(),
        ]
    }
}

#[async_trait]
pub trait TradeSink: Send + Sync {
    async fn write(&self, record: &TradeRecord) -> Result<(), RecordError>;
}

/// Writes the record as pretty JSON, replacing any previous file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TradeSink for JsonFileSink {
    async fn write(&self, record: &TradeRecord) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&self.path, json).await?;
        info!("Trade record written to {}", self.path.display());
        Ok(())
    }
}

pub struct TradeRecorder<S: TradeSink> {
    sink: S,
    timezone: Tz,
}

impl<S: TradeSink> TradeRecorder<S> {
    pub const fn new(sink: S, timezone: Tz) -> Self {
        Self { sink, timezone }
    }

    pub async fn record(&self, report: &PipelineReport) -> Result<TradeRecord, RecordError> {
        let record = TradeRecord::from_report(report, self.timezone);
        self.sink.write(&record).await?;
        Ok(record)
    }
}
