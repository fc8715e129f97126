//! RPC Specification Model
//!
//! This crate contains the core data structures describing an RPC interface:
//! the type registry, per-parameter variable descriptors, entry points and
//! the ordered specification table. It provides pure data structures without
//! any file I/O or code generation logic.

pub mod entry;
pub mod table;
pub mod types;
pub mod var;

// Re-export commonly used types at the crate root
pub use entry::*;
pub use table::*;
pub use types::*;
pub use var::*;
