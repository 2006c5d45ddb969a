//! Dynamic option resolution
//!
//! Selects that declare `dynamicOptions` get their option list from a remote
//! endpoint keyed on another field's answer. Resolution is split into a pure
//! planning step and an apply step so that any host (tokio, browser event
//! loop) can run the fetches itself:
//!
//! 1. [`OptionResolver::plan`] inspects the answers and returns the requests
//!    that have to be issued, each tagged with a per-field generation.
//! 2. The host fetches each request through an [`OptionFetcher`].
//! 3. [`OptionResolver::apply`] merges the outcome, discarding completions
//!    whose generation has been superseded.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::domain::{AnswerMap, AnswerValue, FetchError, FieldDescriptor, FieldOption, HttpMethod};

use super::flatten::flatten;

// ============================================================================
// Fetcher Port
// ============================================================================

/// Transport used to load option lists
#[async_trait(?Send)]
pub trait OptionFetcher {
    /// Issues the request and returns the decoded JSON body
    async fn fetch_options(&self, request: &OptionRequest) -> Result<Value, FetchError>;
}

/// One pending option-list fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRequest {
    pub field_id: String,
    pub depends_on: String,
    pub dependency_value: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub generation: u64,
}

impl OptionRequest {
    /// `endpoint` with `{dependsOn}={value}` appended as a query parameter
    pub fn url(&self) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.endpoint,
            separator,
            urlencoding::encode(&self.depends_on),
            urlencoding::encode(&self.dependency_value)
        )
    }
}

/// Interprets an option endpoint response.
///
/// Accepts a bare array or an object with an `options` array; anything else
/// yields no options.
pub fn parse_options(body: &Value) -> Vec<FieldOption> {
    let entries = match body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("options") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| serde_json::from_value::<FieldOption>(entry.clone()).ok())
        .collect()
}

// ============================================================================
// Resolver
// ============================================================================

#[derive(Debug, Default)]
struct FieldState {
    generation: u64,
    /// Dependency value of the last issued request
    requested: Option<String>,
}

/// Transient per-form cache of resolved option lists
#[derive(Debug, Default)]
pub struct OptionResolver {
    cache: HashMap<String, Vec<FieldOption>>,
    state: HashMap<String, FieldState>,
}

impl OptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved options for `field_id`, if the field is dynamic
    pub fn options(&self, field_id: &str) -> Option<&[FieldOption]> {
        self.cache.get(field_id).map(Vec::as_slice)
    }

    /// Drops everything; called when the schema changes
    pub fn reset(&mut self) {
        self.cache.clear();
        self.state.clear();
    }

    /// Works out which option lists need fetching for the current answers.
    ///
    /// Fields whose dependency is unset get an empty list immediately. A new
    /// dependency value bumps the field's generation and empties its entry
    /// until the matching response arrives. An unchanged value issues nothing.
    pub fn plan(&mut self, fields: &[FieldDescriptor], answers: &AnswerMap) -> Vec<OptionRequest> {
        let mut requests = Vec::new();

        for field in flatten(fields) {
            let Some(dynamic) = field.dynamic_options.as_ref().filter(|_| field.has_dynamic_select()) else {
                continue;
            };

            let state = self.state.entry(field.id.clone()).or_default();
            let dependency_value = answers
                .get(&dynamic.depends_on)
                .filter(|v| !v.is_empty())
                .map(AnswerValue::query_value);

            match dependency_value {
                None => {
                    if state.requested.take().is_some() {
                        state.generation += 1;
                    }
                    self.cache.insert(field.id.clone(), Vec::new());
                }
                Some(value) => {
                    if state.requested.as_deref() == Some(value.as_str()) {
                        continue;
                    }
                    state.generation += 1;
                    state.requested = Some(value.clone());
                    self.cache.insert(field.id.clone(), Vec::new());

                    requests.push(OptionRequest {
                        field_id: field.id.clone(),
                        depends_on: dynamic.depends_on.clone(),
                        dependency_value: value,
                        endpoint: dynamic.endpoint.clone(),
                        method: dynamic.method,
                        generation: state.generation,
                    });
                }
            }
        }

        requests
    }

    /// Merges a completed fetch. Returns false when the completion is stale.
    ///
    /// Failures degrade to an empty list and are logged, never returned.
    pub fn apply(&mut self, request: &OptionRequest, outcome: Result<Value, FetchError>) -> bool {
        let current = self
            .state
            .get(&request.field_id)
            .map(|s| s.generation)
            .unwrap_or_default();

        if current != request.generation {
            debug!(
                "Discarding stale options for {} (generation {} < {})",
                request.field_id, request.generation, current
            );
            return false;
        }

        let options = match outcome {
            Ok(body) => parse_options(&body),
            Err(e) => {
                warn!("Error fetching dynamic options for {}: {}", request.field_id, e);
                Vec::new()
            }
        };

        self.cache.insert(request.field_id.clone(), options);
        true
    }

    /// Plans, fetches concurrently and applies in one call
    pub async fn resolve<F>(&mut self, fetcher: &F, fields: &[FieldDescriptor], answers: &AnswerMap)
    where
        F: OptionFetcher + ?Sized,
    {
        let requests = self.plan(fields, answers);
        if requests.is_empty() {
            return;
        }

        let outcomes =
            futures::future::join_all(requests.iter().map(|request| fetcher.fetch_options(request))).await;

        for (request, outcome) in requests.iter().zip(outcomes) {
            self.apply(request, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldType;
    use serde_json::json;
    use std::cell::RefCell;

    /// Answers from a fixed table and records every URL it was asked for
    struct TableFetcher {
        responses: HashMap<String, Result<Value, FetchError>>,
        calls: RefCell<Vec<String>>,
    }

    impl TableFetcher {
        fn new(responses: Vec<(&str, Result<Value, FetchError>)>) -> Self {
            Self {
                responses: responses.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl OptionFetcher for TableFetcher {
        async fn fetch_options(&self, request: &OptionRequest) -> Result<Value, FetchError> {
            let url = request.url();
            self.calls.borrow_mut().push(url.clone());
            self.responses
                .get(&url)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Status { status: 404, url }))
        }
    }

    fn schema() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("country", "Country", FieldType::Select).with_options(["US", "CA"]),
            FieldDescriptor::new("state", "State", FieldType::Select).with_dynamic_options("country", "/states"),
        ]
    }

    #[test]
    fn test_url_encoding() {
        let request = OptionRequest {
            field_id: "city".to_string(),
            depends_on: "state".to_string(),
            dependency_value: "New York".to_string(),
            endpoint: "/cities?limit=5".to_string(),
            method: HttpMethod::Get,
            generation: 1,
        };
        assert_eq!(request.url(), "/cities?limit=5&state=New%20York");
    }

    #[test]
    fn test_choice_dependency_is_comma_joined() {
        let fields = vec![
            FieldDescriptor::new("coverage", "Coverage", FieldType::Checkbox).with_options(["fire", "flood"]),
            FieldDescriptor::new("rider", "Rider", FieldType::Select).with_dynamic_options("coverage", "/riders"),
        ];
        let mut answers = AnswerMap::new();
        answers.toggle_choice("coverage", "fire", true);
        answers.toggle_choice("coverage", "flood", true);

        let requests = OptionResolver::new().plan(&fields, &answers);
        assert_eq!(requests[0].dependency_value, "fire,flood");
        assert_eq!(requests[0].url(), "/riders?coverage=fire%2Cflood");
    }

    #[test]
    fn test_parse_options_shapes() {
        assert_eq!(parse_options(&json!(["CA", "NY"])), vec![FieldOption::from("CA"), FieldOption::from("NY")]);
        assert_eq!(
            parse_options(&json!({ "options": [{ "label": "A", "value": "a" }] })),
            vec![FieldOption::new("A", "a")]
        );
        assert!(parse_options(&json!({ "data": [] })).is_empty());
        assert!(parse_options(&json!("nope")).is_empty());
    }

    #[test]
    fn test_unset_dependency_yields_empty_without_request() {
        let mut resolver = OptionResolver::new();
        let requests = resolver.plan(&schema(), &AnswerMap::new());
        assert!(requests.is_empty());
        assert_eq!(resolver.options("state"), Some(&[][..]));
        assert_eq!(resolver.options("country"), None);
    }

    #[tokio::test]
    async fn test_resolves_options_for_dependency() {
        let fetcher = TableFetcher::new(vec![(
            "/states?country=US",
            Ok(json!({ "options": [{ "label": "A", "value": "a" }] })),
        )]);
        let mut resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();
        answers.set("country", "US");

        resolver.resolve(&fetcher, &schema(), &answers).await;

        assert_eq!(resolver.options("state"), Some(&[FieldOption::new("A", "a")][..]));
        assert_eq!(fetcher.calls.borrow().as_slice(), ["/states?country=US".to_string()]);

        // Same dependency value: nothing to fetch again
        resolver.resolve(&fetcher, &schema(), &answers).await;
        assert_eq!(fetcher.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let fetcher = TableFetcher::new(vec![]);
        let mut resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();
        answers.set("country", "CA");

        resolver.resolve(&fetcher, &schema(), &answers).await;
        assert_eq!(resolver.options("state"), Some(&[][..]));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();

        answers.set("country", "US");
        let first = resolver.plan(&schema(), &answers).remove(0);
        answers.set("country", "CA");
        let second = resolver.plan(&schema(), &answers).remove(0);
        assert!(second.generation > first.generation);

        assert!(resolver.apply(&second, Ok(json!(["ON", "QC"]))));
        assert!(!resolver.apply(&first, Ok(json!(["NY"]))));
        assert_eq!(resolver.options("state").unwrap().len(), 2);
        assert_eq!(resolver.options("state").unwrap()[0].value, "ON");
    }

    #[test]
    fn test_clearing_dependency_invalidates_in_flight_request() {
        let mut resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();
        answers.set("country", "US");
        let pending = resolver.plan(&schema(), &answers).remove(0);

        answers.set("country", "");
        assert!(resolver.plan(&schema(), &answers).is_empty());
        assert!(!resolver.apply(&pending, Ok(json!(["NY"]))));
        assert_eq!(resolver.options("state"), Some(&[][..]));

        // Choosing the same value again issues a fresh request
        answers.set("country", "US");
        assert_eq!(resolver.plan(&schema(), &answers).len(), 1);
    }

    #[test]
    fn test_results_merge_per_field() {
        let fields = vec![
            FieldDescriptor::new("country", "Country", FieldType::Select),
            FieldDescriptor::new("state", "State", FieldType::Select).with_dynamic_options("country", "/states"),
            FieldDescriptor::new("plan", "Plan", FieldType::Select).with_dynamic_options("country", "/plans"),
        ];
        let mut resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();
        answers.set("country", "US");

        let requests = resolver.plan(&fields, &answers);
        assert_eq!(requests.len(), 2);
        resolver.apply(&requests[1], Ok(json!(["basic"])));
        resolver.apply(&requests[0], Ok(json!(["NY"])));

        assert_eq!(resolver.options("plan").unwrap()[0].value, "basic");
        assert_eq!(resolver.options("state").unwrap()[0].value, "NY");
    }

    #[test]
    fn test_dynamic_options_ignored_on_non_select() {
        let fields = vec![
            FieldDescriptor::new("country", "Country", FieldType::Select),
            FieldDescriptor::new("notes", "Notes", FieldType::Radio).with_dynamic_options("country", "/notes"),
        ];
        let mut answers = AnswerMap::new();
        answers.set("country", "US");
        let mut resolver = OptionResolver::new();
        assert!(resolver.plan(&fields, &answers).is_empty());
        assert_eq!(resolver.options("notes"), None);
    }
}
