//! Native adapters: HTTP client, file stores, autosave task and the mock API

pub mod api_client;
pub mod autosave;
pub mod file_store;
pub mod mock_api;

pub use api_client::ApiClient;
pub use autosave::{DraftAutosaver, DEFAULT_DEBOUNCE};
pub use file_store::{FileDraftStore, FilePreferenceStore};
pub use mock_api::MockApiState;
