use std::collections::HashMap;
use thiserror::Error;

use crate::config::{ApiSettings, Settings};
use crate::domain::FormDefinition;
use crate::engine::check_schema;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_api(&settings.api) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if settings.drafts.dir.as_os_str().is_empty() {
            errors.push(ValidationError::MissingField("drafts.dir".to_string()));
        }

        if settings.preferences.path.as_os_str().is_empty() {
            errors.push(ValidationError::MissingField("preferences.path".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_api(api: &ApiSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if api.base_url.is_empty() {
            errors.push(ValidationError::MissingField("api.base_url".to_string()));
        } else {
            match reqwest::Url::parse(&api.base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(ValidationError::InvalidValue {
                    field: "api.base_url".to_string(),
                    reason: format!("Unsupported scheme '{}'", url.scheme()),
                }),
                Err(e) => errors.push(ValidationError::InvalidValue {
                    field: "api.base_url".to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        if api.timeout_secs == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &crate::config::ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Form ids must be unique and every schema must pass the structural check
    pub fn validate_forms(forms: &[FormDefinition]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_ids = HashMap::new();

        for (idx, form) in forms.iter().enumerate() {
            if form.form_id.is_empty() {
                errors.push(ValidationError::MissingField(format!("forms[{}].formId", idx)));
            }

            if let Some(prev_idx) = seen_ids.insert(&form.form_id, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Form id '{}' appears at indices {} and {}",
                    form.form_id, prev_idx, idx
                )));
            }

            if let Err(e) = check_schema(&form.fields) {
                errors.push(ValidationError::InvalidValue {
                    field: format!("forms[{}] ({})", idx, form.form_id),
                    reason: e.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
