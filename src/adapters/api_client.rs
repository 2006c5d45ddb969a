//! HTTP client for the insurance API
//!
//! Wraps the three API calls a form host needs plus the option-endpoint
//! transport used by the dynamic option resolver.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::{AnswerMap, FetchError, FormDefinition, HttpMethod, SubmissionPage};
use crate::engine::{OptionFetcher, OptionRequest};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| FetchError::Request(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /forms`
    pub async fn list_forms(&self) -> Result<Vec<FormDefinition>, FetchError> {
        let url = self.api_url("/forms");
        let response = self.client.get(&url).send().await.map_err(request_error)?;
        decode_json(response, &url).await
    }

    /// `POST /forms/submit`; any 2xx is success and the body is ignored
    pub async fn submit(&self, answers: &AnswerMap) -> Result<(), FetchError> {
        let url = self.api_url("/forms/submit");
        let response = self
            .client
            .post(&url)
            .json(answers)
            .send()
            .await
            .map_err(request_error)?;

        check_status(&response, &url)?;
        info!("Submitted {} answers to {}", answers.len(), url);
        Ok(())
    }

    /// `GET /forms/submissions`
    pub async fn list_submissions(&self) -> Result<SubmissionPage, FetchError> {
        let url = self.api_url("/forms/submissions");
        let response = self.client.get(&url).send().await.map_err(request_error)?;
        decode_json(response, &url).await
    }

    /// Absolute URL for an option request. Relative endpoints resolve
    /// against the API base URL as if it were a directory.
    pub fn option_url(&self, request: &OptionRequest) -> Result<Url, FetchError> {
        self.base_url
            .join(&request.url())
            .map_err(|e| FetchError::Request(format!("Invalid option endpoint {}: {}", request.endpoint, e)))
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

#[async_trait(?Send)]
impl OptionFetcher for ApiClient {
    async fn fetch_options(&self, request: &OptionRequest) -> Result<Value, FetchError> {
        let url = self.option_url(request)?;
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        debug!("Fetching options for {} via {} {}", request.field_id, request.method.as_str(), url);

        let url_str = url.to_string();
        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(request_error)?;
        decode_json(response, &url_str).await
    }
}

fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Request(format!("Request timed out: {}", err))
    } else if err.is_connect() {
        FetchError::Request(format!("Connection error: {}", err))
    } else {
        FetchError::Request(err.to_string())
    }
}

fn check_status(response: &reqwest::Response, url: &str) -> Result<(), FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T, FetchError> {
    check_status(&response, url)?;
    let bytes = response.bytes().await.map_err(request_error)?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(format!("{} from {}", e, url)))
}
