//! Low-level tushare pro API client.
//!
//! The pro API is a single POST endpoint taking `api_name`, `token`,
//! `params`, and a `fields` list, and answering with a columnar payload
//! (`fields` + `items`). Rows are re-keyed into objects here so endpoint
//! wrappers can decode them with serde.

use anyhow::{anyhow, Context, Result};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

/// Default pro API endpoint.
const TUSHARE_API: &str = "http://api.tushare.pro";

/// Default request budget; free-tier accounts allow 200 calls per minute.
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 190;

/// Client for the tushare pro API.
pub struct TushareClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    msg: Option<String>,
    data: Option<ApiData>,
}

/// Columnar result payload: one name per column, one `Vec<Value>` per row.
#[derive(Debug, Deserialize)]
pub struct ApiData {
    pub fields: Vec<String>,
    pub items: Vec<Vec<Value>>,
}

impl ApiData {
    /// Decodes every row into `T` by zipping column names with row values.
    ///
    /// # Errors
    /// Returns an error if a row does not match the target shape.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let mut rows = Vec::with_capacity(self.items.len());
        for item in self.items {
            let mut object = Map::with_capacity(self.fields.len());
            for (field, value) in self.fields.iter().zip(item) {
                object.insert(field.clone(), value);
            }
            let row = serde_json::from_value(Value::Object(object))
                .context("Failed to decode API row")?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Returns the number of rows in the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the payload has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TushareClient {
    /// Creates a new client with the default endpoint and rate limit.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_config(TUSHARE_API, token, DEFAULT_RATE_LIMIT_PER_MINUTE)
    }

    /// Creates a new client with custom endpoint and per-minute rate limit.
    ///
    /// # Panics
    /// Panics if `rate_limit_per_minute` is zero.
    #[must_use]
    pub fn with_config(api_url: &str, token: String, rate_limit_per_minute: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let quota = Quota::per_minute(
            NonZeroU32::new(rate_limit_per_minute).expect("Rate limit must be > 0"),
        );
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            api_url: api_url.to_string(),
            token,
            rate_limiter,
        }
    }

    /// Calls a pro API endpoint and returns the raw columnar payload.
    ///
    /// Blocks on the rate limiter before issuing the request.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-zero API status code.
    pub async fn call(&self, api_name: &str, params: Value, fields: &str) -> Result<ApiData> {
        self.rate_limiter.until_ready().await;

        let body = serde_json::json!({
            "api_name": api_name,
            "token": self.token,
            "params": params,
            "fields": fields,
        });

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Request to {api_name} failed"))?
            .error_for_status()
            .with_context(|| format!("Request to {api_name} rejected"))?;

        let payload: ApiResponse = response
            .json()
            .await
            .with_context(|| format!("Invalid response from {api_name}"))?;

        if payload.code != 0 {
            return Err(anyhow!(
                "{} returned code {}: {}",
                api_name,
                payload.code,
                payload.msg.unwrap_or_default()
            ));
        }

        let data = payload
            .data
            .ok_or_else(|| anyhow!("{api_name} returned no data"))?;
        debug!("{} returned {} rows", api_name, data.len());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct SampleRow {
        ts_code: String,
        close: Option<f64>,
    }

    #[test]
    fn decodes_columnar_rows() {
        let data = ApiData {
            fields: vec!["ts_code".to_string(), "close".to_string()],
            items: vec![
                vec![Value::from("000001.SZ"), Value::from(11.5)],
                vec![Value::from("600000.SH"), Value::Null],
            ],
        };

        let rows: Vec<SampleRow> = data.decode().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ts_code, "000001.SZ");
        assert_eq!(rows[0].close, Some(11.5));
        assert_eq!(rows[1].close, None);
    }

    #[test]
    fn decode_rejects_mismatched_rows() {
        let data = ApiData {
            fields: vec!["ts_code".to_string()],
            items: vec![vec![Value::from(42)]],
        };

        let result: Result<Vec<SampleRow>> = data.decode();
        assert!(result.is_err());
    }
}
