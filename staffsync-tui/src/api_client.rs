//! Gateway adapter for the StaffSync REST API.
//!
//! [`ApiClient`] exposes one method per backend endpoint and always answers
//! with an [`Envelope`]: transport, protocol, decode and application
//! failures are all folded into `success: false` with a readable message.
//! Requests leave through a [`Transport`]; [`HttpTransport`] is the reqwest
//! implementation used by the binary.

use crate::config::TuiConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use staffsync_core::{
    ApiRequest, EmployeeDraft, EmployeeId, Envelope, GatewayError, GlobalStats, HttpMethod,
    LastSync, MutableSource, RawResponse, Source, SourceEmployee, SourceStatsWire, Transport,
    TransportError, UnifiedEmployee, ValidateRecord,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
}

// ============================================================================
// HTTP TRANSPORT
// ============================================================================

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        let base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiClientError::Config("api_base_url is empty".to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        Ok(RawResponse::new(status.as_u16(), body).with_reason(reason))
    }
}

// ============================================================================
// GATEWAY
// ============================================================================

/// `limit` / `offset` query parameters of the listing endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListParams {
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }
        if let Some(offset) = self.offset {
            request = request.query("offset", offset);
        }
        request
    }
}

/// Body shape shared by every backend response.
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
}

pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ========== STATISTICS ==========

    pub async fn get_stats(&self, bust: bool) -> Envelope<GlobalStats> {
        self.call(cache_bust(ApiRequest::get("/stats"), bust)).await
    }

    /// Per-source counts, map shape `{csv, mysql, postgresql}`.
    pub async fn get_sources_stats(&self, bust: bool) -> Envelope<SourceStatsWire> {
        self.call(cache_bust(ApiRequest::get("/sources/stats"), bust))
            .await
    }

    /// Per-source counts, array shape, used for charting.
    pub async fn get_stats_per_source(&self, bust: bool) -> Envelope<SourceStatsWire> {
        self.call(cache_bust(ApiRequest::get("/stats/sources"), bust))
            .await
    }

    // ========== UNIFIED EMPLOYEES ==========

    pub async fn list_unified_employees(
        &self,
        params: ListParams,
    ) -> Envelope<Vec<UnifiedEmployee>> {
        self.call_rows(params.apply(ApiRequest::get("/employes")))
            .await
    }

    pub async fn get_unified_employee(&self, id: EmployeeId) -> Envelope<UnifiedEmployee> {
        self.call_checked(ApiRequest::get(format!("/employes/{}", id)))
            .await
    }

    // ========== SOURCE EMPLOYEES ==========

    pub async fn list_source_employees(
        &self,
        source: Source,
        params: ListParams,
    ) -> Envelope<Vec<SourceEmployee>> {
        let path = format!("/sources/{}/employes", source.as_path());
        self.call_rows(params.apply(ApiRequest::get(path))).await
    }

    pub async fn get_source_employee(
        &self,
        source: Source,
        id: EmployeeId,
    ) -> Envelope<SourceEmployee> {
        let path = format!("/sources/{}/employes/{}", source.as_path(), id);
        self.call_checked(ApiRequest::get(path)).await
    }

    pub async fn create_source_employee(
        &self,
        source: MutableSource,
        draft: &EmployeeDraft,
    ) -> Envelope<Value> {
        let body = match draft_body(draft) {
            Ok(body) => body,
            Err(message) => return Envelope::failure(message),
        };
        let path = format!("/sources/{}/employes", source.as_path());
        self.call(ApiRequest::post(path).json(body)).await
    }

    /// Full replace of one record.
    pub async fn update_source_employee(
        &self,
        source: MutableSource,
        id: EmployeeId,
        draft: &EmployeeDraft,
    ) -> Envelope<Value> {
        let body = match draft_body(draft) {
            Ok(body) => body,
            Err(message) => return Envelope::failure(message),
        };
        let path = format!("/sources/{}/employes/{}", source.as_path(), id);
        self.call(ApiRequest::put(path).json(body)).await
    }

    pub async fn delete_source_employee(
        &self,
        source: MutableSource,
        id: EmployeeId,
    ) -> Envelope<Value> {
        let path = format!("/sources/{}/employes/{}", source.as_path(), id);
        self.call(ApiRequest::delete(path)).await
    }

    // ========== ETL ==========

    pub async fn trigger_etl(&self) -> Envelope<Value> {
        self.call(ApiRequest::post("/etl/trigger")).await
    }

    pub async fn etl_status(&self) -> Envelope<Value> {
        self.call(ApiRequest::get("/etl/status")).await
    }

    pub async fn etl_history(&self) -> Envelope<Value> {
        self.call(ApiRequest::get("/etl/history")).await
    }

    pub async fn last_sync(&self) -> Envelope<LastSync> {
        self.call(ApiRequest::get("/etl/last-sync")).await
    }

    // ========== PLUMBING ==========

    async fn call<D: DeserializeOwned>(&self, request: ApiRequest) -> Envelope<D> {
        self.exchange(request, |data| Ok((decode(data)?, 0))).await
    }

    async fn call_checked<D>(&self, request: ApiRequest) -> Envelope<D>
    where
        D: DeserializeOwned + ValidateRecord,
    {
        self.exchange(request, |data| {
            let record: D = decode(data)?;
            record.validate()?;
            Ok((record, 0))
        })
        .await
    }

    /// Listing endpoint. Rows are checked one at a time; a row that fails
    /// decoding or validation is dropped and counted in `skipped`.
    async fn call_rows<R>(&self, request: ApiRequest) -> Envelope<Vec<R>>
    where
        R: DeserializeOwned + ValidateRecord,
    {
        let path = request.path.clone();
        self.exchange(request, |data| {
            let rows: Vec<Value> = decode(data)?;
            let mut records = Vec::with_capacity(rows.len());
            let mut skipped = 0;
            for (index, row) in rows.into_iter().enumerate() {
                let checked = serde_json::from_value::<R>(row)
                    .map_err(|e| e.to_string())
                    .and_then(|record| record.validate().map(|_| record).map_err(|e| e.to_string()));
                match checked {
                    Ok(record) => records.push(record),
                    Err(reason) => {
                        skipped += 1;
                        tracing::warn!(%path, index, %reason, "Skipping invalid row");
                    }
                }
            }
            Ok((records, skipped))
        })
        .await
    }

    async fn exchange<D, F>(&self, request: ApiRequest, decode_data: F) -> Envelope<D>
    where
        F: FnOnce(Value) -> Result<(D, usize), GatewayError>,
    {
        let method = request.method;
        let path = request.path.clone();
        match self.try_exchange(request, decode_data).await {
            Ok(envelope) => {
                tracing::debug!(
                    %method,
                    %path,
                    count = ?envelope.count,
                    total = ?envelope.total,
                    skipped = envelope.skipped,
                    "API call succeeded"
                );
                envelope
            }
            Err(err) => {
                tracing::warn!(
                    %method,
                    %path,
                    kind = err.kind(),
                    error = %err,
                    "API call failed"
                );
                err.into()
            }
        }
    }

    async fn try_exchange<D, F>(&self, request: ApiRequest, decode_data: F) -> Result<Envelope<D>, GatewayError>
    where
        F: FnOnce(Value) -> Result<(D, usize), GatewayError>,
    {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(protocol_failure(&response));
        }

        let wire: WireEnvelope =
            serde_json::from_str(&response.body).map_err(|e| GatewayError::Decode {
                reason: e.to_string(),
            })?;
        if !wire.success {
            return Err(GatewayError::Application {
                message: wire
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Request failed".to_string()),
            });
        }

        let (data, skipped) = decode_data(wire.data.unwrap_or(Value::Null))?;

        Ok(Envelope::ok(data)
            .with_message(wire.message.unwrap_or_default())
            .with_counts(wire.count, wire.total)
            .with_skipped(skipped))
    }
}

fn decode<D: DeserializeOwned>(data: Value) -> Result<D, GatewayError> {
    serde_json::from_value(data).map_err(|e| GatewayError::Decode {
        reason: e.to_string(),
    })
}

fn cache_bust(request: ApiRequest, bust: bool) -> ApiRequest {
    if bust {
        request.query("_", chrono::Utc::now().timestamp_millis())
    } else {
        request
    }
}

/// Validated request body. Rejected drafts never reach the transport.
fn draft_body(draft: &EmployeeDraft) -> Result<Value, String> {
    draft.validate().map_err(|e| e.to_string())?;
    serde_json::to_value(draft).map_err(|e| e.to_string())
}

/// Non-2xx status. The backend usually still sends an envelope; its message
/// is more useful than the reason phrase.
fn protocol_failure(response: &RawResponse) -> GatewayError {
    let from_body = serde_json::from_str::<WireEnvelope>(&response.body)
        .ok()
        .and_then(|wire| wire.message)
        .filter(|m| !m.trim().is_empty());
    let reason = match from_body {
        Some(message) => message,
        None if !response.reason.is_empty() => response.reason.clone(),
        None => "request failed".to_string(),
    };
    GatewayError::Protocol {
        status: response.status,
        reason,
    }
}
