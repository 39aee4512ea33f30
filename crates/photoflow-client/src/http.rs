//! reqwest-backed [`RemoteProcessingClient`].

use std::time::Duration;

use async_trait::async_trait;
use photoflow_shared::config::PhotoflowConfig;
use photoflow_shared::models::SubmittedItem;
use tracing::{debug, instrument};

use crate::error::{ClientError, ClientResult};
use crate::payload::{decode_response, ProcessRequest, ProcessedImagePayload};
use crate::remote::RemoteProcessingClient;

/// Configuration for the HTTP processing client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from(&PhotoflowConfig::default())
    }
}

impl From<&PhotoflowConfig> for HttpClientConfig {
    fn from(config: &PhotoflowConfig) -> Self {
        Self {
            endpoint: config.remote.endpoint.clone(),
            timeout: Duration::from_secs(config.remote.timeout_seconds),
            user_agent: config.remote.user_agent.clone(),
        }
    }
}

/// POSTs each item as JSON to a single processing endpoint
#[derive(Debug, Clone)]
pub struct HttpProcessingClient {
    http: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpProcessingClient {
    pub fn new(config: HttpClientConfig) -> ClientResult<Self> {
        if reqwest::Url::parse(&config.endpoint).is_err() {
            return Err(ClientError::config_error(format!(
                "invalid endpoint URL: {}",
                config.endpoint
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl RemoteProcessingClient for HttpProcessingClient {
    #[instrument(skip(self, item), fields(item_id = %item.id, file_name = %item.file_name))]
    async fn process(&self, item: &SubmittedItem) -> ClientResult<ProcessedImagePayload> {
        let request = ProcessRequest::from_item(item);

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        operation: format!("process {}", item.file_name),
                    }
                } else {
                    ClientError::HttpError(e)
                }
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            status = status.as_u16(),
            body_bytes = body.len(),
            "Remote processing responded"
        );

        if !status.is_success() {
            return Err(ClientError::api_error(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        decode_response(&body)
    }
}
