//! 工具层：能力注册表、Agent 派发与派发结果

pub mod dispatcher;
pub mod outcome;
pub mod registry;
pub mod schema;

pub use dispatcher::Dispatcher;
pub use outcome::{DispatchOutcome, StatusClass};
pub use registry::{ToolRegistry, ToolSpec, NO_TOOL};
pub use schema::classification_schema_json;
