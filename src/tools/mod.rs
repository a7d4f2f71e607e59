//! Function tools
//!
//! Tools agents can call by name, and the registry that dispatches them.

pub mod registry;
pub mod types;

pub use registry::ToolRegistry;
pub use types::{FunctionTool, ToolResult};
