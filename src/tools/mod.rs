//! Tools module - external capabilities for the agent
//!
//! Contains the tool trait, the registry, and the configurable HTTP tool.

pub mod http;
pub mod registry;

pub use http::HttpTool;
pub use registry::{Tool, ToolRegistry};
