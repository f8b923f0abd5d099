//! Catalog fetcher for Socrata open-data portals

use crate::config::{RequestConfig, TargetConfig};
use crate::error::{Result, ScoutError};
use crate::progress::ProgressReporter;
use crate::snapshot::{DatasetRecord, Snapshot};
use crate::sync::CatalogFetcher;
use chrono::{TimeZone, Utc};
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// One page of `/api/catalog/v1`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogPage {
    result_set_size: usize,
    #[serde(default)]
    results: Vec<CatalogResult>,
}

#[derive(Debug, Deserialize)]
struct CatalogResult {
    resource: CatalogResource,
}

#[derive(Debug, Deserialize)]
struct CatalogResource {
    id: String,
}

/// The parts of `/api/views/{id}.json` scout keeps
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewMetadata {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    rows_updated_at: Option<i64>,
    #[serde(default)]
    columns: Vec<ViewColumn>,
}

#[derive(Debug, Deserialize)]
struct ViewColumn {
    name: String,
}

/// Fetches catalog snapshots over HTTP with pacing and retries
pub struct SocrataFetcher {
    client: Client,
    request: RequestConfig,
    show_progress: bool,
}

impl SocrataFetcher {
    pub fn new(request: RequestConfig, show_progress: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request.timeout_secs))
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            request,
            show_progress,
        })
    }

    fn url(target: &TargetConfig, endpoint: &str) -> String {
        format!("https://{}{}", target.domain, endpoint)
    }

    /// Sleep a random interval between requests to stay polite
    fn pace(&self) {
        if self.request.max_delay_ms == 0 {
            return;
        }
        let delay = rand::thread_rng().gen_range(self.request.min_delay_ms..=self.request.max_delay_ms);
        std::thread::sleep(Duration::from_millis(delay));
    }

    /// GET a JSON document, retrying transport errors, 429 and 5xx
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request_json(url)?
            .map_err(|status| ScoutError::fetch(format!("{}: HTTP {}", url, status)))
    }

    /// Like `get_json`, but hands back the status of a non-retryable rejection
    fn request_json<T: DeserializeOwned>(&self, url: &str) -> Result<std::result::Result<T, StatusCode>> {
        let mut attempt = 0u32;

        loop {
            self.pace();
            let outcome = self.client.get(url).send();

            let retryable = match outcome {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<T>()
                        .map(Ok)
                        .map_err(|e| ScoutError::fetch(format!("{}: invalid response: {}", url, e)));
                }
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        format!("HTTP {}", status)
                    } else {
                        return Ok(Err(status));
                    }
                }
                Err(e) => e.to_string(),
            };

            attempt += 1;
            if attempt > self.request.max_retries {
                return Err(ScoutError::fetch(format!(
                    "{}: giving up after {} attempts: {}",
                    url, attempt, retryable
                )));
            }

            let backoff = Duration::from_secs(2 * attempt as u64);
            log::warn!("{}: {} (retry {} in {:?})", url, retryable, attempt, backoff);
            std::thread::sleep(backoff);
        }
    }

    /// Ids of every dataset in the catalog, following pagination
    fn fetch_ids(&self, target: &TargetConfig, progress: &mut ProgressReporter) -> Result<Vec<String>> {
        let page_size = self.request.page_size;
        collect_ids(page_size, progress, |offset| {
            self.get_json(&Self::url(
                target,
                &format!("/api/catalog/v1?only=datasets&offset={}&limit={}", offset, page_size),
            ))
        })
    }

    /// Metadata and row count of one dataset
    fn fetch_record(&self, target: &TargetConfig, id: &str) -> Result<DatasetRecord> {
        let view: ViewMetadata = self.get_json(&Self::url(target, &format!("/api/views/{}.json", id)))?;
        let row_count = self.fetch_row_count(target, id)?;

        let last_updated = view
            .rows_updated_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_default();

        Ok(DatasetRecord::new(id, view.name, last_updated)
            .with_description(view.description.unwrap_or_default())
            .with_row_count(row_count)
            .with_columns(view.columns.into_iter().map(|c| c.name).collect()))
    }

    /// Row count via `count(*)`. A missing or unparsable count, or a view the
    /// resource endpoint rejects (non-tabular views answer 4xx), reports 0.
    fn fetch_row_count(&self, target: &TargetConfig, id: &str) -> Result<u64> {
        let url = Self::url(target, &format!("/resource/{}.json?$select=count(*)", id));
        match self.request_json::<serde_json::Value>(&url)? {
            Ok(body) => Ok(count_from_body(&body).unwrap_or_else(|| {
                log::debug!("{}: no row count in response", id);
                0
            })),
            Err(status) => {
                log::debug!("{}: row count unavailable (HTTP {})", id, status);
                Ok(0)
            }
        }
    }
}

/// Walk the catalog pages starting at offset 0 until every listed id is seen
fn collect_ids<F>(page_size: usize, progress: &mut ProgressReporter, mut fetch_page: F) -> Result<Vec<String>>
where
    F: FnMut(usize) -> Result<CatalogPage>,
{
    let mut ids = Vec::new();
    // Pages can overlap while the catalog changes underneath us
    let mut seen = HashSet::new();
    let mut offset = 0usize;

    loop {
        let page = fetch_page(offset)?;
        let received = page.results.len();
        for result in page.results {
            if seen.insert(result.resource.id.clone()) {
                ids.push(result.resource.id);
            }
        }
        progress.update_catalog(ids.len(), page.result_set_size);

        offset += page_size;
        if received == 0 || ids.len() >= page.result_set_size {
            break;
        }
    }

    Ok(ids)
}

/// First value of the first row of a `count(*)` response
fn count_from_body(body: &serde_json::Value) -> Option<u64> {
    body.as_array()?
        .first()?
        .as_object()?
        .values()
        .next()
        .and_then(parse_count)
}

/// Socrata returns counts as strings; accept numbers too
fn parse_count(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

impl CatalogFetcher for SocrataFetcher {
    fn fetch_snapshot(&self, target: &TargetConfig) -> Result<Snapshot> {
        let mut progress = if self.show_progress {
            ProgressReporter::new_for_fetch(&target.domain)
        } else {
            ProgressReporter::new_minimal()
        };

        let ids = self.fetch_ids(target, &mut progress)?;
        progress.finish_catalog(&format!("{}: {} datasets listed", target.domain, ids.len()));
        log::debug!("{}: catalog lists {} datasets", target.domain, ids.len());

        let mut records = Vec::with_capacity(ids.len());
        progress.start_metadata(ids.len() as u64);
        for (done, id) in ids.iter().enumerate() {
            records.push(self.fetch_record(target, id)?);
            progress.update_metadata(done as u64 + 1);
        }
        progress.finish_metadata(&format!("{}: metadata fetched", target.domain));

        Snapshot::from_records(records).map_err(|e| ScoutError::fetch(e.to_string()))
    }
}
