//! Odoo JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use consolidator_core::ledger::SourceError;
use consolidator_shared::config::ErpConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    id: u64,
    params: RpcParams<'a>,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    service: &'static str,
    method: &'static str,
    args: (&'a str, u32, &'a str, &'a str, &'a str, Value, Value),
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: Option<String>,
    data: Option<RpcErrorData>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorData {
    name: Option<String>,
    message: Option<String>,
}

/// Thin client for `object.execute_kw`.
///
/// Authentication happens out of band: the numeric `uid` and API key come
/// from configuration.
pub struct OdooClient {
    http: reqwest::Client,
    url: String,
    database: String,
    uid: u32,
    api_key: String,
    next_id: AtomicU64,
}

impl OdooClient {
    /// Builds a client from ERP configuration.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: &ErpConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            url: config.url.clone(),
            database: config.database.clone(),
            uid: config.uid,
            api_key: config.api_key.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Calls `method` on `model` with positional `args` and keyword `kwargs`.
    ///
    /// # Errors
    ///
    /// Transport failures, timeouts and 5xx answers map to
    /// `SourceError::Unavailable`; JSON-RPC errors and 4xx answers to
    /// `SourceError::Rejected`; unreadable bodies to `SourceError::Decode`.
    pub async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, SourceError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            params: RpcParams {
                service: "object",
                method: "execute_kw",
                args: (&self.database, self.uid, &self.api_key, model, method, args, kwargs),
            },
        };

        let resp = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        if status.is_server_error() {
            return Err(SourceError::Unavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(SourceError::Rejected(format!("HTTP {status}: {body}")));
        }

        parse_response(&body)
    }

    /// `search_read` with a domain, field list and optional limit.
    ///
    /// # Errors
    ///
    /// See [`OdooClient::execute_kw`]. A result that is not a list is a
    /// `SourceError::Decode`.
    pub async fn search_read(
        &self,
        model: &str,
        domain: Value,
        fields: &[&str],
        limit: Option<u32>,
    ) -> Result<Vec<Value>, SourceError> {
        let mut kwargs = json!({ "fields": fields });
        if let Some(limit) = limit {
            kwargs["limit"] = json!(limit);
        }
        match self
            .execute_kw(model, "search_read", json!([domain]), kwargs)
            .await?
        {
            Value::Array(rows) => Ok(rows),
            other => Err(SourceError::Decode(format!(
                "search_read on {model} returned {other}"
            ))),
        }
    }
}

/// Decodes a JSON-RPC response body.
///
/// # Errors
///
/// Returns `SourceError::Rejected` for an `error` member and
/// `SourceError::Decode` for anything that is not a JSON-RPC response.
pub fn parse_response(body: &str) -> Result<Value, SourceError> {
    let response: RpcResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    if let Some(err) = response.error {
        let detail = err.data.as_ref().and_then(|d| d.message.clone());
        let name = err.data.and_then(|d| d.name);
        let message = detail
            .or(err.message)
            .unwrap_or_else(|| "unknown error".into());
        return Err(SourceError::Rejected(match name {
            Some(name) => format!("{name}: {message}"),
            None => message,
        }));
    }

    response
        .result
        .ok_or_else(|| SourceError::Decode("response has neither result nor error".into()))
}
