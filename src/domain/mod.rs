pub mod answers;
pub mod error;
pub mod schema;
pub mod submission;

pub use answers::{AnswerMap, AnswerValue};
pub use error::{FetchError, FormError, PersistenceError, SchemaError};
pub use schema::{
    Condition, DynamicOptions, FieldDescriptor, FieldOption, FieldType, FormDefinition, HttpMethod,
    ValidationRules, MAX_SCHEMA_DEPTH,
};
pub use submission::{SubmissionPage, SubmissionRecord, SubmitReceipt};
