use genflow_logging::{genflow_debug, genflow_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::channel::Channel;
use crate::{RemoteOp, TransportCause, TransportError};

/// Reaches a remote operation through the primary channel, falling back to
/// the secondary one at most once when the primary attempt throws.
pub struct Negotiator {
    primary: Box<dyn Channel>,
    fallback: Option<Box<dyn Channel>>,
}

impl Negotiator {
    pub fn new(primary: Box<dyn Channel>, fallback: Option<Box<dyn Channel>>) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &dyn Channel {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> Option<&dyn Channel> {
        self.fallback.as_deref()
    }

    pub async fn call<P, T>(&self, operation: RemoteOp, payload: &P) -> Result<T, TransportError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(payload).map_err(|err| {
            TransportError::new(operation, TransportCause::Malformed(err.to_string()))
        })?;
        let response = self.send(operation, &payload).await?;
        decode(operation, &response)
    }

    async fn send(&self, operation: RemoteOp, payload: &Value) -> Result<Value, TransportError> {
        let primary_err = match self.primary.invoke(operation.name(), payload).await {
            Ok(response) => {
                genflow_debug!("{} answered via {}", operation, self.primary.label());
                return Ok(response);
            }
            Err(err) => err,
        };

        let Some(fallback) = &self.fallback else {
            genflow_warn!(
                "{} via {} failed ({}); no fallback configured",
                operation,
                self.primary.label(),
                primary_err
            );
            return Err(TransportError::new(
                operation,
                TransportCause::FallbackUnavailable(primary_err),
            ));
        };

        genflow_warn!(
            "{} via {} failed ({}); retrying via {}",
            operation,
            self.primary.label(),
            primary_err,
            fallback.label()
        );
        fallback
            .invoke(operation.name(), payload)
            .await
            .map_err(|fallback_err| {
                TransportError::new(
                    operation,
                    TransportCause::BothChannels {
                        primary: primary_err,
                        fallback: fallback_err,
                    },
                )
            })
    }
}

/// Finds the level of `response` that holds `field`, trying `data`,
/// `data.data`, `data.result` and the top level in that order.
pub fn normalize<'a>(response: &'a Value, field: &str) -> Option<&'a Value> {
    let data = response.get("data");
    [
        data,
        data.and_then(|d| d.get("data")),
        data.and_then(|d| d.get("result")),
        Some(response),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| candidate.get(field).is_some_and(|value| !value.is_null()))
}

fn application_error(response: &Value) -> Option<String> {
    let error = response
        .get("error")
        .or_else(|| response.get("data").and_then(|d| d.get("error")))
        .filter(|value| !value.is_null())?;
    let message = error
        .as_str()
        .or_else(|| error.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(message)
}

fn decode<T: DeserializeOwned>(operation: RemoteOp, response: &Value) -> Result<T, TransportError> {
    let field = operation.key_field();
    match normalize(response, field) {
        Some(envelope) => serde_json::from_value(envelope.clone()).map_err(|err| {
            TransportError::new(operation, TransportCause::Malformed(err.to_string()))
        }),
        None => {
            let cause = match application_error(response) {
                Some(message) => TransportCause::Application(message),
                None => TransportCause::Malformed(format!("no `{field}` in response")),
            };
            Err(TransportError::new(operation, cause))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_prefers_data_level() {
        let response = json!({
            "data": { "status": "done", "result": { "status": "pending" } },
            "status": "failed"
        });
        let level = normalize(&response, "status").unwrap();
        assert_eq!(level["status"], "done");
    }

    #[test]
    fn normalize_walks_nested_levels_in_order() {
        let nested = json!({ "data": { "data": { "requestId": "a" }, "result": { "requestId": "b" } } });
        assert_eq!(normalize(&nested, "requestId").unwrap()["requestId"], "a");

        let result = json!({ "data": { "result": { "requestId": "b" } }, "requestId": "c" });
        assert_eq!(normalize(&result, "requestId").unwrap()["requestId"], "b");

        let top = json!({ "requestId": "c" });
        assert_eq!(normalize(&top, "requestId").unwrap()["requestId"], "c");
    }

    #[test]
    fn null_key_does_not_count_as_present() {
        let response = json!({ "data": { "content": null }, "content": "hello" });
        assert_eq!(normalize(&response, "content").unwrap()["content"], "hello");
    }

    #[test]
    fn error_payload_becomes_application_error() {
        let response = json!({ "error": { "message": "quota exceeded" } });
        let err = decode::<Value>(RemoteOp::Generate, &response).unwrap_err();
        assert_eq!(
            err.cause,
            TransportCause::Application("quota exceeded".to_string())
        );
    }

    #[test]
    fn missing_key_without_error_is_malformed() {
        let response = json!({ "data": { "unexpected": true } });
        let err = decode::<Value>(RemoteOp::Detect, &response).unwrap_err();
        assert!(matches!(err.cause, TransportCause::Malformed(_)));
    }
}
