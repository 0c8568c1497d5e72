/// Dashboard API client
///
/// Async HTTP access to the dashboard backend. Collection fetches return
/// normalized records or an error for the caller to feed into
/// [`Dataset::complete`](crate::dataset::Dataset::complete). History fetches
/// never fail: any problem yields an empty chart.

use crate::chart::ChartData;
use crate::dataset::normalize_payload;
use crate::error::Result;
use crate::resource::{history_url, resource_url, PageParams, Resource};
use crate::value::Record;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base: String,
}

impl DashboardClient {
    pub fn new(base: impl Into<String>) -> Self {
        DashboardClient {
            http: reqwest::Client::new(),
            base: base.into(),
        }
    }

    pub fn with_client(http: reqwest::Client, base: impl Into<String>) -> Self {
        DashboardClient {
            http,
            base: base.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET <base>/<resource>?limit=..&offset=..` for a 1-based page.
    pub async fn fetch_records(&self, resource: Resource, page: usize, limit: usize) -> Result<Vec<Record>> {
        let params = PageParams::for_page(page, limit);
        let url = resource_url(&self.base, resource);
        log::debug!("GET {} limit={} offset={}", url, params.limit, params.offset);

        let payload: JsonValue = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(normalize_payload(&payload))
    }

    /// `POST <base>/m2m/<icc>/history`. Errors are logged and replaced by an
    /// empty chart.
    pub async fn fetch_history(&self, icc: &str, payload: &JsonValue) -> ChartData {
        let url = history_url(&self.base, icc);
        match self.post_json(&url, payload).await {
            Ok(body) => ChartData::from_json_or_empty(body),
            Err(e) => {
                log::error!("history request for {} failed: {}", icc, e);
                ChartData::empty()
            }
        }
    }

    async fn post_json(&self, url: &str, payload: &JsonValue) -> Result<JsonValue> {
        let body = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // port 9 (discard) is not expected to accept HTTP on the loopback interface
    const UNREACHABLE: &str = "http://127.0.0.1:9/internal/dashboard";

    #[tokio::test]
    async fn test_history_failure_is_empty_chart() {
        let client = DashboardClient::new(UNREACHABLE);
        let chart = client.fetch_history("8934", &json!({"months": 6})).await;
        assert_eq!(chart, ChartData::empty());
    }

    #[tokio::test]
    async fn test_records_failure_is_error() {
        let client = DashboardClient::new(UNREACHABLE);
        assert!(client.fetch_records(Resource::Devices, 1, 10).await.is_err());
    }
}
