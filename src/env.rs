use chrono_tz::Tz;
use clap::Parser;
use dca_exchange::{InstrumentId, OkxAuthEnv};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::executor::PollPolicy;
use crate::pipeline::Instruments;

#[derive(clap::ValueEnum, Debug, Clone)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&LogLevel> for Level {
    fn from(log_level: &LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        (&log_level).into()
    }
}

/// Currencies of the purchase and the instruments connecting them. Pairs
/// default to `{stable}-{fiat}` and `{crypto}-{stable}`.
#[derive(Parser, Debug, Clone)]
pub struct InstrumentEnv {
    #[clap(long, env, default_value = "SGD")]
    pub fiat_currency: String,
    #[clap(long, env, default_value = "USDT")]
    pub stable_currency: String,
    #[clap(long, env, default_value = "BTC")]
    pub crypto_asset: String,
    #[clap(long, env)]
    pub fiat_pair: Option<String>,
    #[clap(long, env)]
    pub crypto_pair: Option<String>,
}

impl InstrumentEnv {
    pub fn instruments(&self) -> Instruments {
        let mut instruments = Instruments::new(
            &self.fiat_currency,
            &self.stable_currency,
            &self.crypto_asset,
        );

        if let Some(pair) = &self.fiat_pair {
            instruments.fiat_pair = InstrumentId(pair.clone());
        }
        if let Some(pair) = &self.crypto_pair {
            instruments.crypto_pair = InstrumentId(pair.clone());
        }

        instruments
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Env {
    #[clap(long, env, default_value = "info")]
    pub log_level: LogLevel,
    #[clap(flatten)]
    pub okx_auth: OkxAuthEnv,
    #[clap(flatten)]
    pub instruments: InstrumentEnv,
    /// Fiat amount spent on the stablecoin leg
    #[clap(long, env = "OKX_BUY_AMOUNT", default_value = "80", value_parser = parse_positive_decimal)]
    pub buy_amount: Decimal,
    /// Interval in seconds between order status polling checks
    #[clap(long, env, default_value = "2")]
    pub order_polling_interval: u64,
    /// Polling attempts per order before giving up on a fill
    #[clap(long, env, default_value = "15", value_parser = clap::value_parser!(u32).range(1..))]
    pub order_polling_max_attempts: u32,
    #[clap(long, env, default_value = "trade_log.json")]
    pub trade_log_path: PathBuf,
    /// IANA timezone of the trade record timestamp
    #[clap(long, env, default_value = "Asia/Singapore", value_parser = parse_timezone)]
    pub report_timezone: Tz,
}

impl Env {
    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.order_polling_interval),
            max_attempts: self.order_polling_max_attempts,
        }
    }
}

fn parse_positive_decimal(value: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(value).map_err(|e| format!("invalid amount {value}: {e}"))?;

    if amount <= Decimal::ZERO {
        return Err(format!("amount must be positive, got {value}"));
    }

    Ok(amount)
}

fn parse_timezone(value: &str) -> Result<Tz, String> {
    value
        .parse::<Tz>()
        .map_err(|e| format!("invalid timezone {value}: {e}"))
}

pub fn setup_tracing(log_level: &LogLevel) {
    let level: Level = log_level.into();
    let default_filter = format!("okx_dca={level},dca_exchange={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .compact()
        .init();
}
