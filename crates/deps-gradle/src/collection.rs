//! Per-script aggregate of dependency declarations.
//!
//! [`DependenciesCollection`] owns the script document (or a `&mut` borrow of
//! it) and exposes the configuration-level operations: enumerate, add,
//! replace, remove and look up artifacts.

use deps_core::{NodeId, NodeKind, ScriptDocument};

use crate::config::GradleModelConfig;
use crate::error::{GradleError, Result};
use crate::extractor::DeclarationExtractor;
use crate::notation;
use crate::types::{ArtifactField, ArtifactSpec, ConfigurationName};
use crate::view::{DependencyView, NotationKind};

/// One step of structural removal, keyed on parent kind and argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalStep {
    /// The node is the only argument of this call; remove the call instead
    CollapseCall(NodeId),
    /// The node is one of several arguments of this call
    RemoveArgument { call: NodeId },
    /// The node sits directly in the configuration list
    RemoveFromList,
}

/// Decides how to detach `node` from its parent.
///
/// A call is never left with zero arguments, and sibling arguments are never
/// touched.
pub fn removal_step<D: ScriptDocument + ?Sized>(doc: &D, node: NodeId) -> RemovalStep {
    match doc.parent(node) {
        Some(call) if doc.kind(call) == Some(NodeKind::Call) => {
            if doc.arguments(call) == [node] {
                RemovalStep::CollapseCall(call)
            } else {
                RemovalStep::RemoveArgument { call }
            }
        }
        _ => RemovalStep::RemoveFromList,
    }
}

/// Dependency declarations of one build script, grouped by configuration.
///
/// # Examples
///
/// ```
/// use deps_core::ScriptTree;
/// use deps_gradle::{ArtifactSpec, DependenciesCollection};
///
/// let mut deps = DependenciesCollection::new(ScriptTree::new());
/// deps.add_artifact_notation("implementation", "com.google.guava:guava:18.0")
///     .unwrap();
///
/// let guava = ArtifactSpec::new("guava", Some("com.google.guava"), Some("18.0")).unwrap();
/// assert!(deps.contains_artifact("implementation", &guava));
/// assert!(!deps.contains_artifact("api", &guava));
///
/// assert!(deps.add_artifact_notation("implementation", "::").is_err());
/// ```
#[derive(Debug)]
pub struct DependenciesCollection<D> {
    document: D,
    extractor: DeclarationExtractor,
}

impl<D: ScriptDocument> DependenciesCollection<D> {
    pub fn new(document: D) -> Self {
        Self {
            document,
            extractor: DeclarationExtractor::new(),
        }
    }

    pub fn with_config(document: D, config: &GradleModelConfig) -> Self {
        Self {
            document,
            extractor: DeclarationExtractor::from_config(config),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Configurations declared in the script, in first-declaration order.
    pub fn configurations(&self) -> Vec<ConfigurationName> {
        self.document
            .list_names()
            .into_iter()
            .map(ConfigurationName::from)
            .collect()
    }

    /// Artifact dependencies of one configuration, in declaration order.
    pub fn artifacts_for(&self, configuration: impl AsRef<str>) -> Vec<DependencyView> {
        let configuration = ConfigurationName::new(configuration.as_ref());
        self.extractor.extract_all(&self.document, &configuration)
    }

    /// Artifact dependencies of every configuration.
    pub fn artifacts(&self) -> Vec<DependencyView> {
        self.configurations()
            .iter()
            .flat_map(|configuration| self.extractor.extract_all(&self.document, configuration))
            .collect()
    }

    /// Appends a compact-notation declaration and returns its view.
    ///
    /// Fails with [`GradleError::InvalidNotation`] if a field would not
    /// survive compact notation, e.g. a group containing `:`.
    pub fn add_artifact(
        &mut self,
        configuration: impl Into<ConfigurationName>,
        spec: &ArtifactSpec,
    ) -> Result<DependencyView> {
        notation::check_compact(spec)?;
        let configuration = configuration.into();
        let text = notation::serialize(spec);
        let node = self.document.append_literal(configuration.as_str(), &text);

        if !configuration.is_well_known() {
            tracing::trace!(%configuration, "adding to custom configuration");
        }
        tracing::debug!(%configuration, notation = %text, %node, "added artifact");

        Ok(DependencyView::Compact {
            node,
            configuration,
            spec: spec.clone(),
        })
    }

    /// Parses `text` and appends it. Fails without touching the document if
    /// the notation has no name.
    pub fn add_artifact_notation(
        &mut self,
        configuration: impl Into<ConfigurationName>,
        text: &str,
    ) -> Result<DependencyView> {
        let spec = notation::parse_with_policy(text, self.extractor.policy())
            .ok_or_else(|| GradleError::invalid_notation(text))?;
        self.add_artifact(configuration, &spec)
    }

    /// Writes a new version through the view.
    pub fn set_version(&mut self, view: &mut DependencyView, version: &str) -> Result<()> {
        view.set_version(&mut self.document, version)
    }

    /// Removes the declaration behind `view`.
    ///
    /// Collapses wrapping calls that would be left without arguments. Returns
    /// `false` (and logs a warning) if the node is no longer reachable from
    /// the view's configuration, e.g. after a concurrent undo.
    pub fn remove(&mut self, view: DependencyView) -> bool {
        let configuration = view.configuration().as_str();
        let mut target = view.node();

        if !self.is_reachable(configuration, target) {
            tracing::warn!(%configuration, node = %target, "dependency node not found, skipping removal");
            return false;
        }

        loop {
            match removal_step(&self.document, target) {
                RemovalStep::CollapseCall(call) => {
                    tracing::debug!(%call, argument = %target, "collapsing single-argument call");
                    target = call;
                }
                RemovalStep::RemoveArgument { call } => {
                    return match self.document.remove_argument(call, target) {
                        Ok(()) => true,
                        Err(err) => {
                            tracing::warn!(%call, node = %target, error = %err, "failed to remove argument");
                            false
                        }
                    };
                }
                RemovalStep::RemoveFromList => {
                    let removed = self.document.remove_from_list(configuration, target);
                    if !removed {
                        tracing::warn!(%configuration, node = %target, "node missing from configuration list");
                    }
                    return removed;
                }
            }
        }
    }

    /// Rewrites the declaration behind `view` to declare `spec` instead.
    ///
    /// Compact declarations get new notation text. Map declarations keep
    /// their shape: each field of `spec` is written to its property and
    /// properties for absent fields are deleted. Returns `false` (and logs a
    /// warning) if the node is unreachable from the view's configuration or
    /// the document rejects the write; the view is stale either way.
    pub fn replace(&mut self, view: DependencyView, spec: &ArtifactSpec) -> bool {
        let configuration = view.configuration().as_str();
        let node = view.node();

        if !self.is_reachable(configuration, node) {
            tracing::warn!(%configuration, %node, "dependency node not found, skipping replace");
            return false;
        }

        let result = match view.notation() {
            NotationKind::Compact => self.replace_literal(node, spec),
            NotationKind::Map => self.replace_properties(node, spec),
        };
        match result {
            Ok(()) => {
                tracing::debug!(%configuration, %node, artifact = %spec, "replaced artifact");
                true
            }
            Err(err) => {
                tracing::warn!(%configuration, %node, error = %err, "failed to replace artifact");
                false
            }
        }
    }

    /// Whether any declaration of `configuration` equals `target` field by field.
    pub fn contains_artifact(&self, configuration: impl AsRef<str>, target: &ArtifactSpec) -> bool {
        self.artifacts_for(configuration)
            .iter()
            .any(|view| view.matches(&self.document, target))
    }

    fn replace_literal(&mut self, node: NodeId, spec: &ArtifactSpec) -> Result<()> {
        notation::check_compact(spec)?;
        self.document.set_literal(node, &notation::serialize(spec))?;
        Ok(())
    }

    /// Name comes first in [`ArtifactField::ALL`] and is always present, so a
    /// non-map node fails before any property changes.
    fn replace_properties(&mut self, node: NodeId, spec: &ArtifactSpec) -> Result<()> {
        for field in ArtifactField::ALL {
            let key = field.map_key();
            match spec.get(field) {
                Some(value) => self.document.set_property(node, key, value)?,
                None => {
                    self.document.remove_property(node, key)?;
                }
            }
        }
        Ok(())
    }

    fn is_reachable(&self, configuration: &str, node: NodeId) -> bool {
        if self.document.kind(node).is_none() {
            return false;
        }
        let mut root = node;
        while let Some(parent) = self.document.parent(root) {
            root = parent;
        }
        self.document.list(configuration).contains(&root)
    }
}
