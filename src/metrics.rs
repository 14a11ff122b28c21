//! Object storage bucket metrics

use crate::api::client::Client;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

const BUCKET_METRICS_PATH: &str = "v1/metrics/buckets";

/// Query for `GET v1/metrics/buckets`.
///
/// Dates are whole UTC days. Empty filters select every bucket or user.
#[derive(Debug, Clone)]
pub struct BucketMetricsRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bucket_names: Vec<String>,
    pub objects_user_ids: Vec<String>,
}

impl BucketMetricsRequest {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            bucket_names: Vec::new(),
            objects_user_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketMetrics {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub data: Vec<BucketMetricsData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketMetricsData {
    pub subject: BucketMetricsSubject,
    pub time_series: Vec<BucketMetricsInterval>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketMetricsSubject {
    pub bucket_name: String,
    pub objects_user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketMetricsInterval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub usage: BucketMetricsUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketMetricsUsage {
    pub requests: u64,
    pub object_count: u64,
    pub storage_bytes: u64,
    pub received_bytes: u64,
    pub sent_bytes: u64,
}

impl Client {
    pub async fn bucket_metrics(&self, query: &BucketMetricsRequest) -> Result<BucketMetrics> {
        let http = self.http();
        let mut request = http.new_request::<()>(Method::GET, BUCKET_METRICS_PATH, None)?;

        request.append_query("start", &query.start.format("%Y-%m-%d").to_string());
        request.append_query("end", &query.end.format("%Y-%m-%d").to_string());
        for name in &query.bucket_names {
            request.append_query("bucket_name", name);
        }
        for id in &query.objects_user_ids {
            request.append_query("objects_user_id", id);
        }

        Ok(http.execute::<BucketMetrics>(request).await?.value)
    }
}
