//! Analysis backend client with a short-lived response cache

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::transport::{HttpResponse, Transport};
use super::types::{
    backend_error, decode_analysis, disposition_filename, Envelope, ExportKind, ExportRequest,
    ExportedFile, HealthStatus,
};
use crate::domain::{AnalysisResult, Chain, DateRange};
use crate::error::GatewayError;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    chain: Chain,
    address: String,
    start: NaiveDate,
    end: NaiveDate,
}

struct CachedAnalysis {
    fetched_at: Instant,
    result: Arc<AnalysisResult>,
}

pub struct Gateway {
    transport: Arc<dyn Transport>,
    base_url: String,
    ttl: Duration,
    /// Cache: (chain, address, start, end) -> last successful analysis
    cache: Arc<RwLock<HashMap<CacheKey, CachedAnalysis>>>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch an analysis, serving a fresh cached copy when one exists
    pub async fn fetch(
        &self,
        chain: Chain,
        address: &str,
        range: DateRange,
    ) -> Result<Arc<AnalysisResult>, GatewayError> {
        let key = CacheKey {
            chain,
            address: address.to_string(),
            start: range.start(),
            end: range.end(),
        };

        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!(%chain, address, "analysis cache hit");
                    return Ok(Arc::clone(&entry.result));
                }
            }
        }

        let url = format!(
            "{}/analyze/{}/{}?start_date={}&end_date={}",
            self.base_url,
            chain.slug(),
            address,
            range.start(),
            range.end()
        );
        info!(%chain, address, %range, "requesting analysis");
        let response = self.transport.get(&url).await?;
        ensure_success(&response)?;

        let result = Arc::new(decode_analysis(chain, address, range, &response.body)?);
        info!(
            %chain,
            address,
            transactions = result.transactions.len(),
            "analysis received"
        );

        // Only successful responses reach the cache
        self.cache.write().await.insert(
            key,
            CachedAnalysis {
                fetched_at: Instant::now(),
                result: Arc::clone(&result),
            },
        );
        Ok(result)
    }

    pub async fn export_pdf(&self, request: &ExportRequest) -> Result<ExportedFile, GatewayError> {
        self.export(ExportKind::Pdf, request).await
    }

    pub async fn export_csv(&self, request: &ExportRequest) -> Result<ExportedFile, GatewayError> {
        self.export(ExportKind::Csv, request).await
    }

    /// Render a statement on the backend. Never cached.
    ///
    /// PDF is a plain `GET` rendered from the backend's own data; CSV is a
    /// `POST` carrying the corrected transactions and balances.
    pub async fn export(
        &self,
        kind: ExportKind,
        request: &ExportRequest,
    ) -> Result<ExportedFile, GatewayError> {
        info!(kind = kind.extension(), chain = %request.chain, "requesting export");
        let response = match kind {
            ExportKind::Pdf => {
                let url = format!(
                    "{}/export/pdf/{}/{}?start_date={}&end_date={}",
                    self.base_url,
                    request.chain.slug(),
                    request.address,
                    request.range.start(),
                    request.range.end()
                );
                self.transport.get(&url).await?
            }
            ExportKind::Csv => {
                let url = format!("{}/export-csv", self.base_url);
                self.transport.post_json(&url, &request.payload()?).await?
            }
        };
        ensure_success(&response)?;

        // A JSON reply to an export request is an error report, not a file
        if response.is_json() {
            let envelope: Envelope = serde_json::from_slice(&response.body)
                .map_err(|e| GatewayError::Decode(e.to_string()))?;
            if envelope.success == Some(false) {
                return Err(GatewayError::Backend(
                    envelope.error.unwrap_or_else(|| "export failed".to_string()),
                ));
            }
            return Err(GatewayError::Decode(
                "expected a file but received JSON".to_string(),
            ));
        }
        if response.body.is_empty() {
            return Err(GatewayError::Decode("empty export body".to_string()));
        }

        let filename = response
            .content_disposition
            .as_deref()
            .and_then(disposition_filename)
            .unwrap_or_else(|| request.default_filename(kind));

        Ok(ExportedFile {
            kind,
            filename,
            bytes: response.body,
        })
    }

    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let response = self
            .transport
            .get(&format!("{}/health", self.base_url))
            .await?;
        ensure_success(&response)?;
        serde_json::from_slice(&response.body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Drop every cached analysis
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        debug!(entries = cache.len(), "analysis cache cleared");
        cache.clear();
    }
}

fn ensure_success(response: &HttpResponse) -> Result<(), GatewayError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "backend request failed");
    Err(match backend_error(&response.body) {
        Some(message) => GatewayError::Backend(message),
        None => GatewayError::Status {
            status: response.status,
        },
    })
}
