//! Minimal JSON-RPC 2.0 transport over HTTP used by the balance adapters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::worker::MonitorError;

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: T,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl<T> JsonRpcResponse<T> {
    pub fn into_result(self, method: &str) -> Result<T, MonitorError> {
        if let Some(err) = self.error {
            return Err(MonitorError::Rpc(format!(
                "{method} returned error {}: {}",
                err.code, err.message
            )));
        }
        self.result
            .ok_or_else(|| MonitorError::Rpc(format!("{method} returned no result")))
    }
}

/// One endpoint, one `reqwest` client. Request ids are per-client and
/// monotonically increasing.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, MonitorError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response: JsonRpcResponse<R> = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_result(method)
    }
}
