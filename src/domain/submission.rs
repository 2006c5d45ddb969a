use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `GET /forms/submissions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPage {
    #[serde(default)]
    pub data: Vec<SubmissionRecord>,
    #[serde(default)]
    pub columns: Vec<String>,
}

/// One past submission; `id` plus whatever columns the server reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl SubmissionRecord {
    /// Cell value for `column`, `id` included
    pub fn cell(&self, column: &str) -> Option<Value> {
        if column == "id" {
            Some(Value::String(self.id.clone()))
        } else {
            self.values.get(column).cloned()
        }
    }
}

/// Body returned by `POST /forms/submit`; only success matters to clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(super::schema::scalar_to_string(&value))
}
