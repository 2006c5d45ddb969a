#![allow(dead_code)]

use coverform::adapters::MockApiState;
use coverform::config::OptionList;
use coverform::domain::FormDefinition;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;

pub fn home_form() -> FormDefinition {
    serde_json::from_value(json!({
        "formId": "home",
        "title": "Home Insurance",
        "fields": [
            { "id": "owner", "label": "Owner", "type": "text", "required": true },
            { "id": "country", "label": "Country", "type": "select", "required": true, "options": ["US", "CA"] },
            {
                "id": "state", "label": "State", "type": "select", "required": true,
                "dynamicOptions": { "dependsOn": "country", "endpoint": "/options/states", "method": "GET" }
            },
            { "id": "has_pool", "label": "Pool", "type": "radio", "options": ["Yes", "No"] },
            {
                "id": "pool_fence", "label": "Pool fence", "type": "text", "required": true,
                "conditional": { "fieldId": "has_pool", "value": "Yes" }
            },
            { "id": "extras", "label": "Extras", "type": "checkbox", "options": ["flood", "fire"] },
            { "id": "newsletter", "label": "Newsletter", "type": "checkbox" }
        ]
    }))
    .unwrap()
}

pub fn auto_form() -> FormDefinition {
    serde_json::from_value(json!({
        "formId": "auto",
        "title": "Auto Insurance",
        "fields": [
            {
                "id": "vehicle", "label": "Vehicle", "type": "group",
                "fields": [
                    { "id": "make", "label": "Make", "type": "text", "required": true },
                    { "id": "year", "label": "Year", "type": "number", "validation": { "min": 1950, "max": 2026 } }
                ]
            }
        ]
    }))
    .unwrap()
}

pub fn option_lists() -> HashMap<String, OptionList> {
    let list: OptionList = serde_json::from_value(json!({
        "name": "states",
        "options": {
            "US": ["CA", "NY"],
            "CA": [{ "label": "Ontario", "value": "ON" }]
        }
    }))
    .unwrap();
    HashMap::from([(list.name.clone(), list)])
}

pub fn mock_state() -> MockApiState {
    MockApiState::new(vec![home_form(), auto_form()], option_lists())
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
}

impl TestServer {
    pub async fn new() -> Self {
        let app = coverform::create_app(mock_state());

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestServer { addr, base_url }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
