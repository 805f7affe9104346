//! Tool System - the fixed hospital catalog and its mock executor

mod catalog;
mod executor;

pub use catalog::{ParamSpec, ToolCatalog, ToolDescriptor};
pub use executor::{DomainExecutor, MockDomainExecutor, UNKNOWN_TOOL_RESULT, serialize_args};
