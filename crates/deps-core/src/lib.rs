//! Core abstractions for deps-gradle.
//!
//! This crate provides the document-facing layer shared by the dependency
//! model and its hosts.
//!
//! # Architecture
//!
//! deps-core defines:
//! - **Traits**: `ScriptDocument`, the narrow contract a host's script tree
//!   satisfies so dependency declarations can be read and edited in place
//! - **Tree**: `ScriptTree`, an arena-backed implementation of that contract
//! - **Error Types**: `DepsError` for writes the tree cannot apply
//!
//! # Examples
//!
//! ```
//! use deps_core::{NodeKind, ScriptDocument, ScriptTree};
//!
//! let mut tree = ScriptTree::new();
//! let node = tree.append_literal("implementation", "com.google.guava:guava:18.0");
//!
//! assert_eq!(tree.kind(node), Some(NodeKind::Literal));
//! assert_eq!(tree.literal(node), Some("com.google.guava:guava:18.0"));
//! ```

pub mod document;
pub mod error;
pub mod tree;

// Re-export commonly used types
pub use document::{NodeId, NodeKind, ScriptDocument, Slot, ValueForm};
pub use error::{DepsError, Result};
pub use tree::{Expr, MapEntry, ScriptTree};
