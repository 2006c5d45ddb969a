//! # Coverform - Schema-driven insurance application forms
//!
//! Coverform turns JSON form schemas served by an insurance API into
//! interactive application forms. The engine is host-neutral: the same code
//! drives the command-line host in this crate and the browser UI in `ui/`.
//!
//! ## Features
//!
//! - **Schema model**: nested sections, groups, conditional visibility and
//!   dynamically loaded select options
//! - **Render tree**: derived from the schema and the current answers, never cached
//! - **Validation**: required-field checks over the visible fields only
//! - **Drafts**: per-form answer drafts under `draft-{formId}`, saved after a
//!   quiet period
//! - **Submissions table**: search, sort, column selection and pagination
//! - **Mock API**: a local axum server with the same routes as the real API
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coverform::adapters::ApiClient;
//! use coverform::drafts::InMemoryDraftStore;
//! use coverform::session::FormSession;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://127.0.0.1:3000", Duration::from_secs(30))?;
//!     let mut session = FormSession::new(InMemoryDraftStore::new());
//!     session.load_forms(client.list_forms().await?)?;
//!     session.resolve_options(&client).await;
//!     println!("{} fields", session.render().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema, answer and submission types plus errors
//! - **Engine**: flatten, visibility, validation, option resolution, render tree
//! - **Session / Drafts / Preferences / Table**: host-facing state
//! - **Adapters** (`native` feature): reqwest client, file stores, autosave, mock API
//! - **Config** (`native` feature): layered settings

/// Production insurance API
pub const DEFAULT_BASE_URL: &str = "https://assignment.devotel.io/api/insurance";

pub mod domain;
pub mod drafts;
pub mod engine;
pub mod i18n;
pub mod preferences;
pub mod session;
pub mod table;

#[cfg(feature = "native")]
pub mod adapters;
#[cfg(feature = "native")]
pub mod cli;
#[cfg(feature = "native")]
pub mod config;

#[cfg(feature = "native")]
pub use native::create_app;

#[cfg(feature = "native")]
mod native {
    use axum::{routing::get, Router};

    use crate::adapters::mock_api::{self, MockApiState};

    /// Creates the mock insurance API router.
    ///
    /// Routes mirror the real API: `GET /forms`, `POST /forms/submit`,
    /// `GET /forms/submissions`, plus `GET|POST /options/:list` for
    /// dynamic select options.
    pub fn create_app(state: MockApiState) -> Router {
        Router::new()
            .route("/forms", get(mock_api::list_forms))
            .route("/forms/submit", axum::routing::post(mock_api::submit_form))
            .route("/forms/submissions", get(mock_api::list_submissions))
            .route("/options/:list", get(mock_api::list_options).post(mock_api::list_options))
            .with_state(state)
            .layer(
                tower_http::cors::CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::Any)
                    .allow_headers(tower_http::cors::Any),
            )
    }
}
