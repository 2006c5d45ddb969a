//! Form evaluation engine
//!
//! Everything here is a pure function of (schema, answers, option cache):
//! - `flatten`: schema walking and structural checks
//! - `visibility`: conditional display
//! - `validator`: required-field checks
//! - `options`: dynamic option planning and merging
//! - `render`: projection into host-neutral render nodes

pub mod flatten;
pub mod options;
pub mod render;
pub mod validator;
pub mod visibility;

pub use flatten::{check_schema, flatten};
pub use options::{parse_options, OptionFetcher, OptionRequest, OptionResolver};
pub use render::{build_render_tree, InputKind, RenderNode};
pub use validator::validate;
pub use visibility::is_visible;
