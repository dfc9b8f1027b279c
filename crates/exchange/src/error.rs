use reqwest::header::InvalidHeaderValue;

/// Failure of a single exchange operation.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Failed to create header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("{action} failed with status: {status}, body: {body}")]
    RequestFailed {
        action: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{action} rejected with code {code}: {msg}")]
    Envelope {
        action: String,
        code: String,
        msg: String,
    },
    #[error(
        "Failed to parse API response: {action}, response: {response_text}, error: {parse_error}"
    )]
    ApiResponseParse {
        action: String,
        response_text: String,
        parse_error: String,
    },
    #[error("{action} returned no data rows")]
    MissingData { action: String },
    #[error("Invalid decimal in field {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Invalid server time: {0}")]
    ServerTime(String),
    #[error("Secret key cannot be used as an HMAC key")]
    HmacKey,
}

impl ExchangeError {
    /// Network or HTTP-level failure, as opposed to the exchange answering
    /// with a domain error.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Reqwest(_) | Self::RequestFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transport() {
        let http = ExchangeError::RequestFailed {
            action: "get balance".to_string(),
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert!(http.is_transport());

        let rejected = ExchangeError::Envelope {
            action: "place order".to_string(),
            code: "51008".to_string(),
            msg: "Insufficient balance".to_string(),
        };
        assert!(!rejected.is_transport());
        assert_eq!(
            rejected.to_string(),
            "place order rejected with code 51008: Insufficient balance"
        );
    }
}
