//! Line-delimited JSON bridge.
//!
//! Each input line is `{"id", "method", "params"}`; each output line is
//! `{"id", "result"}` or `{"id", "error": {"code", "message"}}`. Requests are
//! handled concurrently, so responses may come back out of input order and
//! are matched by `id`.

use std::io;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::HealthPlugin;
use crate::error::{PluginError, PluginResult};
use crate::types::{AggregatedRequest, PermissionsRequest, WorkoutsRequest};

pub const BRIDGE_ERRORS: &str = "health_bridge_bridge_errors_total";

#[derive(Debug, Deserialize)]
pub struct BridgeRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BridgeError>,
}

impl BridgeResponse {
    fn from_outcome(id: Value, outcome: PluginResult<Value>) -> Self {
        match outcome {
            Ok(result) => Self {
                id,
                result: Some(result),
                error: None,
            },
            Err(e) => Self {
                id,
                result: None,
                error: Some(BridgeError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }),
            },
        }
    }
}

fn decode<T: DeserializeOwned>(params: Value) -> PluginResult<T> {
    Ok(serde_json::from_value(params)?)
}

fn encode<T: Serialize>(value: &T) -> PluginResult<Value> {
    serde_json::to_value(value).map_err(|e| PluginError::Provider(e.to_string()))
}

/// JSON schemas of every request type, keyed by method name.
pub fn describe() -> Value {
    let permissions = schemars::schema_for!(PermissionsRequest);
    let aggregated = schemars::schema_for!(AggregatedRequest);
    let workouts = schemars::schema_for!(WorkoutsRequest);
    serde_json::json!({
        "checkHealthPermissions": &permissions,
        "requestHealthPermissions": &permissions,
        "queryAggregated": aggregated,
        "queryWorkouts": workouts,
    })
}

pub async fn dispatch(plugin: &HealthPlugin, method: &str, params: Value) -> PluginResult<Value> {
    match method {
        "isHealthAvailable" => encode(&plugin.is_health_available().await),
        "checkHealthPermissions" => {
            encode(&plugin.check_health_permissions(decode(params)?).await?)
        }
        "requestHealthPermissions" => {
            encode(&plugin.request_health_permissions(decode(params)?).await?)
        }
        "queryAggregated" => encode(&plugin.query_aggregated(decode(params)?).await?),
        "queryWorkouts" => encode(&plugin.query_workouts(decode(params)?).await?),
        "openHealthConnectSettings" | "openAppleHealthSettings" => {
            plugin.open_health_settings().await;
            Ok(Value::Null)
        }
        "showHealthConnectInPlayStore" => {
            plugin.show_in_store().await;
            Ok(Value::Null)
        }
        "describe" => Ok(describe()),
        other => Err(PluginError::UnknownMethod(other.to_string())),
    }
}

/// Handle one input line. Returns `None` for blank lines.
pub async fn handle_line(plugin: &HealthPlugin, line: &str) -> Option<BridgeResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let request: BridgeRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "malformed bridge request");
            return Some(BridgeResponse::from_outcome(
                Value::Null,
                Err(PluginError::InvalidParameters(e.to_string())),
            ));
        }
    };

    let span = tracing::debug_span!("bridge", method = %request.method, id = %request.id);
    let outcome = dispatch(plugin, &request.method, request.params)
        .instrument(span)
        .await;
    if let Err(e) = &outcome {
        metrics::counter!(BRIDGE_ERRORS, "code" => e.code()).increment(1);
        tracing::debug!(method = %request.method, code = e.code(), error = %e, "request failed");
    }
    Some(BridgeResponse::from_outcome(request.id, outcome))
}

/// Serve requests from `reader` until EOF, writing responses to `writer`.
///
/// Returns the writer once every in-flight request has been answered.
pub async fn serve<R, W>(plugin: Arc<HealthPlugin>, reader: R, mut writer: W) -> io::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<W, io::Error>(writer)
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let plugin = plugin.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let Some(response) = handle_line(&plugin, &line).await else {
                return;
            };
            match serde_json::to_string(&response) {
                Ok(encoded) => {
                    if tx.send(encoded).is_err() {
                        tracing::warn!("response writer closed");
                    }
                }
                Err(e) => tracing::error!(error = %e, "could not encode response"),
            }
        });
    }
    drop(tx);

    writer_task.await.map_err(io::Error::other)?
}
