//! # kiln-tools
//!
//! The tool contract the orchestrator requires, a registry for dispatching
//! calls by name, and the result formatter that stringifies tool output for
//! conversation history.
//!
//! Tool bodies themselves live outside this workspace — the orchestrator
//! only needs `display` (a short human-readable summary of a call) and an
//! async `execute`.

#![deny(unsafe_code)]

pub mod errors;
pub mod format;
pub mod registry;
pub mod traits;

pub use errors::ToolError;
pub use format::format_result;
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolContext};
