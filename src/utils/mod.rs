//! Generic utility primitives with zero domain knowledge.
//!
//! - `shell` - Platform shell invocation
//! - `template` - `{key}` placeholder extraction and rendering
//! - `validation` - Input validation helpers

pub mod shell;
pub mod template;
pub mod validation;
