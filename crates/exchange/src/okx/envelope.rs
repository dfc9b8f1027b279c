use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ExchangeError;

const SUCCESS_CODE: &str = "0";

/// `{code, msg, data: [...]}` wrapper around every OKX REST response.
///
/// `data` is kept untyped until the code is checked, since failed requests
/// often carry rows of a different shape than successful ones.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

impl Envelope {
    /// The top-level `msg` is frequently empty on rejections, in which case
    /// the reason lives in the first row's `sMsg`.
    fn failure_message(&self) -> String {
        if !self.msg.is_empty() {
            return self.msg.clone();
        }

        self.data
            .first()
            .and_then(|row| row.get("sMsg"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

pub(crate) fn parse_envelope<T: DeserializeOwned>(
    action: &str,
    response_text: &str,
) -> Result<Vec<T>, ExchangeError> {
    let parse_error = |parse_error: serde_json::Error| ExchangeError::ApiResponseParse {
        action: action.to_string(),
        response_text: response_text.to_string(),
        parse_error: parse_error.to_string(),
    };

    let envelope: Envelope = serde_json::from_str(response_text).map_err(parse_error)?;

    if envelope.code != SUCCESS_CODE {
        return Err(ExchangeError::Envelope {
            action: action.to_string(),
            msg: envelope.failure_message(),
            code: envelope.code,
        });
    }

    envelope
        .data
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(parse_error))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        value: String,
    }

    #[test]
    fn test_success_returns_rows() {
        let rows: Vec<Row> =
            parse_envelope("test", r#"{"code":"0","msg":"","data":[{"value":"a"},{"value":"b"}]}"#)
                .unwrap();

        assert_eq!(
            rows,
            vec![
                Row {
                    value: "a".to_string()
                },
                Row {
                    value: "b".to_string()
                }
            ]
        );
    }

    #[test]
    fn test_success_without_data_is_empty() {
        let rows: Vec<Row> = parse_envelope("test", r#"{"code":"0","msg":""}"#).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_non_zero_code_is_domain_error() {
        let err = parse_envelope::<Row>(
            "get balance",
            r#"{"code":"50113","msg":"Invalid Sign","data":[]}"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ExchangeError::Envelope { ref action, ref code, ref msg }
            if action == "get balance" && code == "50113" && msg == "Invalid Sign"
        ));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_rejection_reason_falls_back_to_row_message() {
        let err = parse_envelope::<Row>(
            "place order",
            r#"{"code":"1","msg":"","data":[{"ordId":"","sCode":"51008","sMsg":"Order failed. Insufficient balance"}]}"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ExchangeError::Envelope { ref code, ref msg, .. }
            if code == "1" && msg == "Order failed. Insufficient balance"
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_envelope::<Row>("get order", "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::ApiResponseParse { ref action, ref response_text, .. }
            if action == "get order" && response_text == "<html>bad gateway</html>"
        ));
    }

    #[test]
    fn test_row_shape_mismatch() {
        let err =
            parse_envelope::<Row>("test", r#"{"code":"0","msg":"","data":[{"other":1}]}"#)
                .unwrap_err();
        assert!(matches!(err, ExchangeError::ApiResponseParse { .. }));
    }
}
