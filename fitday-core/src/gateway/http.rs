//! HTTP implementation of the record gateway.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::{GatewayError, RecordGateway, UpdateStatus, UpsertStatus};
use crate::models::DailyRecord;

/// Path of the record collection on the server.
pub const RECORD_PATH: &str = "/api/user/meal-plan";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection options for [`HttpRecordGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayOptions {
    /// Bearer token sent with every request
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Use the server's single-call upsert instead of update-then-create
    pub native_upsert: bool,
}

impl Default for HttpGatewayOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            native_upsert: false,
        }
    }
}

/// Record gateway backed by the meal plan REST endpoints.
///
/// - `GET    {base}/api/user/meal-plan/{date}`: fetch
/// - `PUT    {base}/api/user/meal-plan/{date}`: update (`null` body or 404 when missing)
/// - `POST   {base}/api/user/meal-plan`: create (409 when the date exists)
/// - `PUT    {base}/api/user/meal-plan/{date}?upsert=true`: native upsert
#[derive(Debug, Clone)]
pub struct HttpRecordGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    native_upsert: bool,
}

impl HttpRecordGateway {
    pub fn new(
        base_url: impl Into<String>,
        options: HttpGatewayOptions,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: options.api_key,
            native_upsert: options.native_upsert,
        })
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, RECORD_PATH)
    }

    fn record_url(&self, date: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            RECORD_PATH,
            urlencoding::encode(date)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Reads the body of a failed response into a status error.
    async fn status_error(response: Response) -> GatewayError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        GatewayError::Status(status, body)
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl RecordGateway for HttpRecordGateway {
    async fn fetch(&self, date: &str) -> Result<DailyRecord, GatewayError> {
        let response = self
            .authorize(self.client.get(self.record_url(date)))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(Self::status_error(response).await);
        }

        let body = response.text().await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

        match value {
            // An answered fetch with no record reads as an empty day.
            Value::Null => Ok(DailyRecord::new(date)),
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| GatewayError::Malformed(e.to_string()))
            }
            other => Err(GatewayError::Malformed(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    async fn update(&self, record: &DailyRecord) -> Result<UpdateStatus, GatewayError> {
        let response = self
            .authorize(self.client.put(self.record_url(&record.date)))
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(UpdateStatus::NotFound);
        }
        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(UpdateStatus::NotFound);
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

        if is_truthy(&value) {
            Ok(UpdateStatus::Modified)
        } else {
            Ok(UpdateStatus::NotFound)
        }
    }

    async fn create(&self, record: &DailyRecord) -> Result<(), GatewayError> {
        let response = self
            .authorize(self.client.post(self.collection_url()))
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Conflict(body));
        }
        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(())
    }

    fn supports_upsert(&self) -> bool {
        self.native_upsert
    }

    async fn upsert(&self, record: &DailyRecord) -> Result<UpsertStatus, GatewayError> {
        if !self.native_upsert {
            return Err(GatewayError::Unsupported);
        }

        let response = self
            .authorize(self.client.put(self.record_url(&record.date)))
            .query(&[("upsert", "true")])
            .json(record)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(UpsertStatus::Created),
            status if status.is_success() => Ok(UpsertStatus::Updated),
            _ => Err(Self::status_error(response).await),
        }
    }
}
