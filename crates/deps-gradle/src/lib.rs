//! Gradle dependency declaration model.
//!
//! This crate reads and edits the artifact dependencies declared in a Groovy
//! build script, writing every change straight through to the script tree.
//!
//! # Features
//!
//! - Compact (`'group:name:version:classifier@ext'`) and map
//!   (`group: 'g', name: 'n'`) notations behind one view type
//! - Wrapping calls such as `platform(...)` searched recursively, with
//!   `project`, `fileTree` and `files` excluded
//! - Structural removal that never leaves an empty call behind, and in-place
//!   replacement that keeps each declaration's notation
//! - `ext` and `def` string variables resolved in references, `$` templates
//!   and map values
//! - A lenient reader for `dependencies { }` blocks and a renderer for them
//!   that keeps configuration closures
//!
//! # Example
//!
//! ```
//! use deps_gradle::{
//!     ArtifactSpec, DependenciesCollection, config::FormatterConfig, parse_build_script,
//!     render_dependencies,
//! };
//!
//! let tree = parse_build_script(
//!     "dependencies {\n\
//!          compile 'org.hibernate:hibernate:3.1'\n\
//!          compile project(':javaLib')\n\
//!      }\n",
//! )
//! .unwrap();
//!
//! let mut deps = DependenciesCollection::new(tree);
//! let mut hibernate = deps.artifacts_for("compile").remove(0);
//! deps.set_version(&mut hibernate, "3.0").unwrap();
//!
//! let expected = ArtifactSpec::new("hibernate", Some("org.hibernate"), Some("3.0")).unwrap();
//! assert!(deps.contains_artifact("compile", &expected));
//!
//! let rendered = render_dependencies(deps.document(), &FormatterConfig::default());
//! assert!(rendered.contains("compile 'org.hibernate:hibernate:3.0'"));
//! assert!(rendered.contains("compile project(':javaLib')"));
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod extractor;
pub mod formatter;
pub mod notation;
pub mod parser;
pub mod resolve;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use collection::{DependenciesCollection, RemovalStep, removal_step};
pub use config::GradleModelConfig;
pub use error::{GradleError, Result};
pub use extractor::DeclarationExtractor;
pub use formatter::render_dependencies;
pub use parser::{load_build_script, parse_build_script};
pub use types::{ArtifactField, ArtifactSpec, ConfigurationName, configuration_names};
pub use view::{DependencyView, NotationKind};
