use base64::prelude::*;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;
use url::Url;

use super::{OkxAuthEnv, SERVER_TIME_PATH, envelope::parse_envelope};
use crate::ExchangeError;

type HmacSha256 = Hmac<Sha256>;

/// ISO-8601 with millisecond precision and a literal `Z`, as OKX expects.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const ACCESS_KEY: HeaderName = HeaderName::from_static("ok-access-key");
const ACCESS_SIGN: HeaderName = HeaderName::from_static("ok-access-sign");
const ACCESS_TIMESTAMP: HeaderName = HeaderName::from_static("ok-access-timestamp");
const ACCESS_PASSPHRASE: HeaderName = HeaderName::from_static("ok-access-passphrase");
const SIMULATED_TRADING: HeaderName = HeaderName::from_static("x-simulated-trading");

#[derive(Debug, Deserialize)]
struct ServerTimeRow {
    ts: String,
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Base64 HMAC-SHA256 of `timestamp + METHOD + request_path + body`.
pub fn sign(
    secret_key: &str,
    timestamp: &str,
    method: &Method,
    request_path: &str,
    body: &str,
) -> Result<String, ExchangeError> {
    let prehash = format!("{timestamp}{}{request_path}{body}", method.as_str());

    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|_| ExchangeError::HmacKey)?;
    mac.update(prehash.as_bytes());

    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds authentication headers, timestamped with the exchange's clock.
///
/// Server time is fetched for every signature. There is no fallback to the
/// local clock.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    auth: OkxAuthEnv,
    http: reqwest::Client,
    base_url: Url,
}

impl RequestSigner {
    pub fn new(auth: OkxAuthEnv, http: reqwest::Client, base_url: Url) -> Self {
        Self {
            auth,
            http,
            base_url,
        }
    }

    pub async fn server_time(&self) -> Result<DateTime<Utc>, ExchangeError> {
        const ACTION: &str = "get server time";

        let response = self
            .http
            .get(self.base_url.join(SERVER_TIME_PATH)?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExchangeError::RequestFailed {
                action: ACTION.to_string(),
                status,
                body,
            });
        }

        let row = parse_envelope::<ServerTimeRow>(ACTION, &body)?
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::MissingData {
                action: ACTION.to_string(),
            })?;

        let millis: i64 = row
            .ts
            .parse()
            .map_err(|_| ExchangeError::ServerTime(row.ts.clone()))?;

        DateTime::from_timestamp_millis(millis).ok_or(ExchangeError::ServerTime(row.ts))
    }

    pub async fn headers(
        &self,
        method: &Method,
        request_path: &str,
        body: &str,
    ) -> Result<HeaderMap, ExchangeError> {
        let timestamp = format_timestamp(self.server_time().await?);
        let signature = sign(
            &self.auth.secret_key,
            &timestamp,
            method,
            request_path,
            body,
        )?;

        debug!("Signed {method} {request_path} at server time {timestamp}");

        let mut headers = [
            (ACCESS_KEY, HeaderValue::from_str(&self.auth.api_key)?),
            (ACCESS_SIGN, HeaderValue::from_str(&signature)?),
            (ACCESS_TIMESTAMP, HeaderValue::from_str(&timestamp)?),
            (ACCESS_PASSPHRASE, HeaderValue::from_str(&self.auth.passphrase)?),
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
        ]
        .into_iter()
        .collect::<HeaderMap>();

        if self.auth.simulated_trading {
            headers.insert(SIMULATED_TRADING, HeaderValue::from_static("1"));
        }

        Ok(headers)
    }
}
