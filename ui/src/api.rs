//! API client for the insurance backend

use async_trait::async_trait;
use coverform::domain::{AnswerMap, FetchError, FormDefinition, HttpMethod, SubmissionPage};
use coverform::engine::{OptionFetcher, OptionRequest};
use gloo_net::http::{Request, Response};
use serde_json::Value;

/// Base URL baked in at build time through `COVERFORM_API_BASE`
pub fn api_base() -> &'static str {
    option_env!("COVERFORM_API_BASE")
        .unwrap_or(coverform::DEFAULT_BASE_URL)
        .trim_end_matches('/')
}

fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

/// GET /forms
pub async fn list_forms() -> Result<Vec<FormDefinition>, FetchError> {
    let url = api_url("/forms");
    let response = Request::get(&url).send().await.map_err(request_error)?;
    decode_json(response, &url).await
}

/// POST /forms/submit
pub async fn submit(answers: &AnswerMap) -> Result<(), FetchError> {
    let url = api_url("/forms/submit");
    let response = Request::post(&url)
        .json(answers)
        .map_err(|e| FetchError::Request(format!("Failed to serialize body: {}", e)))?
        .send()
        .await
        .map_err(request_error)?;
    check_status(&response, &url)
}

/// GET /forms/submissions
pub async fn list_submissions() -> Result<SubmissionPage, FetchError> {
    let url = api_url("/forms/submissions");
    let response = Request::get(&url).send().await.map_err(request_error)?;
    decode_json(response, &url).await
}

/// Option endpoints through `fetch`; relative endpoints resolve against the API base
#[derive(Clone, Copy, Default)]
pub struct GlooOptionFetcher;

#[async_trait(?Send)]
impl OptionFetcher for GlooOptionFetcher {
    async fn fetch_options(&self, request: &OptionRequest) -> Result<Value, FetchError> {
        let url = web_sys::Url::new_with_base(&request.url(), &format!("{}/", api_base()))
            .map(|u| u.href())
            .map_err(|_| FetchError::Request(format!("Invalid option endpoint {}", request.endpoint)))?;

        let builder = match request.method {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
        };
        let response = builder.send().await.map_err(request_error)?;
        decode_json(response, &url).await
    }
}

fn request_error(err: gloo_net::Error) -> FetchError {
    FetchError::Request(err.to_string())
}

fn check_status(response: &Response, url: &str) -> Result<(), FetchError> {
    if response.ok() {
        Ok(())
    } else {
        Err(FetchError::Status {
            status: response.status(),
            url: url.to_string(),
        })
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: Response, url: &str) -> Result<T, FetchError> {
    check_status(&response, url)?;
    response
        .json()
        .await
        .map_err(|e| FetchError::Decode(format!("{} from {}", e, url)))
}
