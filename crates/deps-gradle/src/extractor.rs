//! Classification of declaration nodes into dependency views.

use deps_core::{NodeId, NodeKind, ScriptDocument};

use crate::config::GradleModelConfig;
use crate::notation::SegmentPolicy;
use crate::types::ConfigurationName;
use crate::view::DependencyView;

/// Calls that declare project references or local files, never artifacts.
pub const EXCLUDED_CALLEES: &[&str] = &["project", "fileTree", "files"];

/// Nesting limit for wrapping calls such as `platform(enforcedPlatform(...))`.
pub const MAX_CALL_DEPTH: usize = 16;

/// Produces [`DependencyView`]s from the nodes of a configuration list.
///
/// Rules, in order:
/// 1. map node: one map view if it has a `name`
/// 2. call node: nothing for excluded callees, otherwise recurse into every
///    argument
/// 3. literal or reference node: one compact view if the value, after
///    variable resolution, parses
///
/// # Examples
///
/// ```
/// use deps_core::{ScriptTree, Slot};
/// use deps_gradle::extractor::DeclarationExtractor;
///
/// let mut tree = ScriptTree::new();
/// let project = tree.insert_call(Slot::list("implementation"), "project").unwrap();
/// tree.insert_literal(Slot::Argument(project), ":lib").unwrap();
/// tree.insert_literal(Slot::list("implementation"), "com.google.guava:guava:18.0").unwrap();
///
/// let views = DeclarationExtractor::new().extract_all(&tree, &"implementation".into());
/// assert_eq!(views.len(), 1);
/// assert_eq!(views[0].name(&tree), "guava");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeclarationExtractor {
    extra_excluded: Vec<String>,
    policy: SegmentPolicy,
}

impl DeclarationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GradleModelConfig) -> Self {
        Self {
            extra_excluded: config.extra_excluded_callees.clone(),
            policy: config.segment_policy,
        }
    }

    pub fn policy(&self) -> SegmentPolicy {
        self.policy
    }

    pub fn is_excluded(&self, callee: &str) -> bool {
        EXCLUDED_CALLEES.contains(&callee) || self.extra_excluded.iter().any(|c| c == callee)
    }

    /// Views declared by one list entry, in argument order.
    pub fn extract<D: ScriptDocument + ?Sized>(
        &self,
        doc: &D,
        configuration: &ConfigurationName,
        node: NodeId,
    ) -> Vec<DependencyView> {
        let mut views = Vec::new();
        self.collect(doc, configuration, node, 0, &mut views);
        views
    }

    /// Views declared by every entry of a configuration, in list order.
    pub fn extract_all<D: ScriptDocument + ?Sized>(
        &self,
        doc: &D,
        configuration: &ConfigurationName,
    ) -> Vec<DependencyView> {
        let mut views = Vec::new();
        for node in doc.list(configuration.as_str()) {
            self.collect(doc, configuration, node, 0, &mut views);
        }
        views
    }

    fn collect<D: ScriptDocument + ?Sized>(
        &self,
        doc: &D,
        configuration: &ConfigurationName,
        node: NodeId,
        depth: usize,
        views: &mut Vec<DependencyView>,
    ) {
        match doc.kind(node) {
            Some(NodeKind::Map) => {
                views.extend(DependencyView::from_map(doc, configuration.clone(), node));
            }
            Some(NodeKind::Call) => {
                let callee = doc.callee(node).unwrap_or_default();
                if self.is_excluded(callee) {
                    tracing::trace!(%configuration, callee, "skipping non-artifact call");
                    return;
                }
                if depth >= MAX_CALL_DEPTH {
                    tracing::debug!(%configuration, callee, depth, "call nesting too deep");
                    return;
                }
                for argument in doc.arguments(node) {
                    self.collect(doc, configuration, argument, depth + 1, views);
                }
            }
            Some(NodeKind::Literal | NodeKind::Reference) => {
                views.extend(DependencyView::from_literal(
                    doc,
                    configuration.clone(),
                    node,
                    self.policy,
                ));
            }
            None => {}
        }
    }
}
