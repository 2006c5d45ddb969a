//! Local stand-in for the insurance API
//!
//! Serves form definitions and option lists loaded from disk and keeps
//! submissions in memory, so the CLI and the browser UI can run offline.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::OptionList;
use crate::domain::FormDefinition;

/// Shared state for the mock API handlers
#[derive(Clone, Default)]
pub struct MockApiState {
    pub forms: Arc<RwLock<Vec<FormDefinition>>>,
    pub option_lists: Arc<RwLock<HashMap<String, OptionList>>>,
    submissions: Arc<RwLock<Vec<Map<String, Value>>>>,
}

impl MockApiState {
    pub fn new(forms: Vec<FormDefinition>, option_lists: HashMap<String, OptionList>) -> Self {
        Self {
            forms: Arc::new(RwLock::new(forms)),
            option_lists: Arc::new(RwLock::new(option_lists)),
            submissions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

/// GET /forms
pub async fn list_forms(State(state): State<MockApiState>) -> impl IntoResponse {
    let forms = state.forms.read().await;
    (StatusCode::OK, Json(forms.clone()))
}

/// POST /forms/submit - Store an answer map
pub async fn submit_form(State(state): State<MockApiState>, Json(body): Json<Value>) -> impl IntoResponse {
    let Value::Object(answers) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Submission must be a JSON object" })),
        );
    };

    let id = uuid::Uuid::new_v4().to_string();
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(id.clone()));
    record.insert(
        "submittedAt".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    for (key, value) in answers {
        if key != "id" && key != "submittedAt" {
            record.insert(key, value);
        }
    }

    state.submissions.write().await.push(record);
    info!("Stored submission {}", id);

    (StatusCode::OK, Json(json!({ "success": true, "id": id })))
}

/// GET /forms/submissions
pub async fn list_submissions(State(state): State<MockApiState>) -> impl IntoResponse {
    let submissions = state.submissions.read().await;

    let mut columns = vec!["id".to_string()];
    for record in submissions.iter() {
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    (
        StatusCode::OK,
        Json(json!({ "data": submissions.clone(), "columns": columns })),
    )
}

/// GET|POST /options/:list - The first query parameter selects the entries
pub async fn list_options(
    State(state): State<MockApiState>,
    Path(list): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let lists = state.option_lists.read().await;
    let Some(option_list) = lists.get(&list) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Option list not found: {}", list) })),
        );
    };

    let options = params
        .first()
        .and_then(|(_, value)| option_list.options.get(value))
        .cloned()
        .unwrap_or_default();

    (StatusCode::OK, Json(json!({ "options": options })))
}
