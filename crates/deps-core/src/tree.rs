//! In-memory script document.
//!
//! [`ScriptTree`] is an arena of expression nodes plus the ordered
//! configuration lists that reference them. Removed nodes leave a tombstone
//! behind so stale [`NodeId`]s read as absent instead of aliasing a newer node.

use crate::document::{NodeId, NodeKind, ScriptDocument, Slot, ValueForm};
use crate::error::{DepsError, Result};

/// One `key: value` pair of a map expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub key: String,
    pub value: String,
    pub form: ValueForm,
}

impl MapEntry {
    /// Creates an entry holding a plain string literal.
    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_form(key, value, ValueForm::Plain)
    }

    /// Creates an entry holding a `$`-interpolated string.
    pub fn template(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_form(key, value, ValueForm::Template)
    }

    /// Creates an entry holding a variable reference.
    pub fn reference(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_form(key, value, ValueForm::Reference)
    }

    fn with_form(key: impl Into<String>, value: impl Into<String>, form: ValueForm) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            form,
        }
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    /// Double-quoted string with placeholders, stored as written
    Template(String),
    Map(Vec<MapEntry>),
    Call {
        callee: String,
        arguments: Vec<NodeId>,
    },
    Reference(String),
}

impl Expr {
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Literal(_) | Self::Template(_) => NodeKind::Literal,
            Self::Map(_) => NodeKind::Map,
            Self::Call { .. } => NodeKind::Call,
            Self::Reference(_) => NodeKind::Reference,
        }
    }

    pub const fn value_form(&self) -> Option<ValueForm> {
        match self {
            Self::Literal(_) => Some(ValueForm::Plain),
            Self::Template(_) => Some(ValueForm::Template),
            Self::Reference(_) => Some(ValueForm::Reference),
            Self::Map(_) | Self::Call { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    expr: Expr,
    parent: Option<NodeId>,
    /// Raw `{ ... }` source attached to the declaration
    closure: Option<String>,
}

impl Entry {
    const fn new(expr: Expr, parent: Option<NodeId>) -> Self {
        Self {
            expr,
            parent,
            closure: None,
        }
    }
}

/// Arena-backed [`ScriptDocument`].
///
/// Removal tombstones a node's slot rather than reclaiming it, so the arena
/// only grows: a tree that sees many add/remove cycles holds one empty slot
/// per node ever removed. Re-parse the script to compact it. [`len`] counts
/// live nodes only and is O(1).
///
/// Script variables (`ext { }` entries and `def` declarations) live next to
/// the nodes and back [`ScriptDocument::variable`].
///
/// [`len`]: ScriptTree::len
///
/// # Examples
///
/// ```
/// use deps_core::{NodeKind, ScriptDocument, ScriptTree, Slot};
///
/// let mut tree = ScriptTree::new();
/// let call = tree.insert_call(Slot::list("implementation"), "platform").unwrap();
/// let arg = tree
///     .insert_literal(Slot::Argument(call), "org.springframework:spring-bom:5.3.0")
///     .unwrap();
///
/// assert_eq!(tree.kind(call), Some(NodeKind::Call));
/// assert_eq!(tree.parent(arg), Some(call));
/// assert_eq!(tree.list("implementation"), vec![call]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptTree {
    nodes: Vec<Option<Entry>>,
    lists: Vec<(String, Vec<NodeId>)>,
    variables: Vec<(String, String)>,
    live: usize,
}

impl ScriptTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub const fn len(&self) -> usize {
        self.live
    }

    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Payload of a live node.
    pub fn expr(&self, node: NodeId) -> Option<&Expr> {
        self.entry(node).map(|entry| &entry.expr)
    }

    /// Map entries of a map node, in declaration order.
    pub fn entries(&self, node: NodeId) -> &[MapEntry] {
        match self.expr(node) {
            Some(Expr::Map(entries)) => entries,
            _ => &[],
        }
    }

    /// Raw closure source attached to a node, braces included.
    pub fn closure(&self, node: NodeId) -> Option<&str> {
        self.entry(node).and_then(|entry| entry.closure.as_deref())
    }

    pub fn set_closure(&mut self, node: NodeId, source: impl Into<String>) -> Result<()> {
        self.entry_mut(node)?.closure = Some(source.into());
        Ok(())
    }

    /// Records a string variable. A later definition replaces an earlier one.
    pub fn define_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.variables.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, current)) => *current = value,
            None => self.variables.push((name, value)),
        }
    }

    pub fn insert_literal(&mut self, slot: Slot, text: impl Into<String>) -> Result<NodeId> {
        self.insert(slot, Expr::Literal(text.into()))
    }

    pub fn insert_template(&mut self, slot: Slot, text: impl Into<String>) -> Result<NodeId> {
        self.insert(slot, Expr::Template(text.into()))
    }

    pub fn insert_map(&mut self, slot: Slot, entries: Vec<MapEntry>) -> Result<NodeId> {
        self.insert(slot, Expr::Map(entries))
    }

    pub fn insert_call(&mut self, slot: Slot, callee: impl Into<String>) -> Result<NodeId> {
        self.insert(
            slot,
            Expr::Call {
                callee: callee.into(),
                arguments: Vec::new(),
            },
        )
    }

    pub fn insert_reference(&mut self, slot: Slot, text: impl Into<String>) -> Result<NodeId> {
        self.insert(slot, Expr::Reference(text.into()))
    }

    fn insert(&mut self, slot: Slot, expr: Expr) -> Result<NodeId> {
        let id = NodeId::new(self.nodes.len());
        match slot {
            Slot::List(name) => {
                self.nodes.push(Some(Entry::new(expr, None)));
                self.list_entry_mut(&name).push(id);
            }
            Slot::Argument(call) => {
                // Validate before pushing so a failed insert leaves no orphan.
                self.arguments_mut(call)?;
                self.nodes.push(Some(Entry::new(expr, Some(call))));
                self.arguments_mut(call)?.push(id);
            }
        }
        self.live += 1;
        Ok(id)
    }

    fn entry(&self, node: NodeId) -> Option<&Entry> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    fn entry_mut(&mut self, node: NodeId) -> Result<&mut Entry> {
        self.nodes
            .get_mut(node.index())
            .and_then(Option::as_mut)
            .ok_or(DepsError::UnknownNode(node))
    }

    fn map_entries_mut(&mut self, node: NodeId) -> Result<&mut Vec<MapEntry>> {
        match &mut self.entry_mut(node)?.expr {
            Expr::Map(entries) => Ok(entries),
            other => Err(DepsError::kind_mismatch(node, NodeKind::Map, other.kind())),
        }
    }

    fn arguments_mut(&mut self, call: NodeId) -> Result<&mut Vec<NodeId>> {
        match &mut self.entry_mut(call)?.expr {
            Expr::Call { arguments, .. } => Ok(arguments),
            other => Err(DepsError::kind_mismatch(call, NodeKind::Call, other.kind())),
        }
    }

    fn list_entry_mut(&mut self, name: &str) -> &mut Vec<NodeId> {
        let index = match self.lists.iter().position(|(list, _)| list == name) {
            Some(index) => index,
            None => {
                self.lists.push((name.to_string(), Vec::new()));
                self.lists.len() - 1
            }
        };
        &mut self.lists[index].1
    }

    /// Tombstones a node and everything below it.
    fn drop_subtree(&mut self, node: NodeId) {
        let Some(entry) = self.nodes.get_mut(node.index()).and_then(Option::take) else {
            return;
        };
        self.live -= 1;
        if let Expr::Call { arguments, .. } = entry.expr {
            for argument in arguments {
                self.drop_subtree(argument);
            }
        }
    }
}

impl ScriptDocument for ScriptTree {
    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.expr(node).map(Expr::kind)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node).and_then(|entry| entry.parent)
    }

    fn literal(&self, node: NodeId) -> Option<&str> {
        match self.expr(node) {
            Some(Expr::Literal(text) | Expr::Template(text)) => Some(text),
            _ => None,
        }
    }

    fn set_literal(&mut self, node: NodeId, text: &str) -> Result<()> {
        let expr = &mut self.entry_mut(node)?.expr;
        match expr {
            Expr::Map(_) | Expr::Call { .. } => Err(DepsError::kind_mismatch(
                node,
                NodeKind::Literal,
                expr.kind(),
            )),
            _ => {
                *expr = Expr::Literal(text.to_string());
                Ok(())
            }
        }
    }

    fn reference(&self, node: NodeId) -> Option<&str> {
        match self.expr(node) {
            Some(Expr::Reference(text)) => Some(text),
            _ => None,
        }
    }

    fn value_form(&self, node: NodeId) -> Option<ValueForm> {
        self.expr(node).and_then(Expr::value_form)
    }

    fn property(&self, node: NodeId, key: &str) -> Option<&str> {
        self.entries(node)
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    fn property_form(&self, node: NodeId, key: &str) -> Option<ValueForm> {
        self.entries(node)
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.form)
    }

    fn set_property(&mut self, node: NodeId, key: &str, value: &str) -> Result<()> {
        let entries = self.map_entries_mut(node)?;
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                value.clone_into(&mut entry.value);
                entry.form = ValueForm::Plain;
            }
            None => entries.push(MapEntry::literal(key, value)),
        }
        Ok(())
    }

    fn remove_property(&mut self, node: NodeId, key: &str) -> Result<bool> {
        let entries = self.map_entries_mut(node)?;
        let before = entries.len();
        entries.retain(|entry| entry.key != key);
        Ok(entries.len() != before)
    }

    fn callee(&self, node: NodeId) -> Option<&str> {
        match self.expr(node) {
            Some(Expr::Call { callee, .. }) => Some(callee),
            _ => None,
        }
    }

    fn arguments(&self, node: NodeId) -> Vec<NodeId> {
        match self.expr(node) {
            Some(Expr::Call { arguments, .. }) => arguments.clone(),
            _ => Vec::new(),
        }
    }

    fn add_argument(&mut self, call: NodeId, text: &str) -> Result<NodeId> {
        self.insert_literal(Slot::Argument(call), text)
    }

    fn remove_argument(&mut self, call: NodeId, argument: NodeId) -> Result<()> {
        let arguments = self.arguments_mut(call)?;
        let Some(index) = arguments.iter().position(|&arg| arg == argument) else {
            return Err(DepsError::NotAnArgument { call, argument });
        };
        arguments.remove(index);
        self.drop_subtree(argument);
        tracing::trace!(%call, %argument, "removed call argument");
        Ok(())
    }

    fn list_names(&self) -> Vec<String> {
        self.lists.iter().map(|(name, _)| name.clone()).collect()
    }

    fn list(&self, name: &str) -> Vec<NodeId> {
        self.lists
            .iter()
            .find(|(list, _)| list == name)
            .map(|(_, nodes)| nodes.clone())
            .unwrap_or_default()
    }

    fn append_literal(&mut self, name: &str, text: &str) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes
            .push(Some(Entry::new(Expr::Literal(text.to_string()), None)));
        self.list_entry_mut(name).push(id);
        self.live += 1;
        id
    }

    fn remove_from_list(&mut self, name: &str, node: NodeId) -> bool {
        let Some(list_index) = self.lists.iter().position(|(list, _)| list == name) else {
            return false;
        };
        let nodes = &mut self.lists[list_index].1;
        let Some(index) = nodes.iter().position(|&n| n == node) else {
            return false;
        };
        nodes.remove(index);
        if nodes.is_empty() {
            self.lists.remove(list_index);
        }
        self.drop_subtree(node);
        tracing::trace!(list = name, %node, "removed list entry");
        true
    }

    fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_wrapper() -> (ScriptTree, NodeId, NodeId, NodeId) {
        let mut tree = ScriptTree::new();
        let call = tree.insert_call(Slot::list("api"), "platform").unwrap();
        let first = tree.insert_literal(Slot::Argument(call), "g:a:1.0").unwrap();
        let second = tree.insert_literal(Slot::Argument(call), "g:b:2.0").unwrap();
        (tree, call, first, second)
    }

    #[test]
    fn test_insert_into_list_preserves_order() {
        let mut tree = ScriptTree::new();
        let a = tree.insert_literal(Slot::list("api"), "g:a:1").unwrap();
        let b = tree.insert_literal(Slot::list("api"), "g:b:1").unwrap();
        let c = tree.insert_literal(Slot::list("compile"), "g:c:1").unwrap();

        assert_eq!(tree.list("api"), vec![a, b]);
        assert_eq!(tree.list("compile"), vec![c]);
        assert_eq!(tree.list_names(), vec!["api", "compile"]);
        assert!(tree.list("runtime").is_empty());
    }

    #[test]
    fn test_insert_argument_into_non_call_fails() {
        let mut tree = ScriptTree::new();
        let literal = tree.insert_literal(Slot::list("api"), "g:a:1").unwrap();
        let err = tree
            .insert_literal(Slot::Argument(literal), "g:b:1")
            .unwrap_err();

        assert_eq!(
            err,
            DepsError::kind_mismatch(literal, NodeKind::Call, NodeKind::Literal)
        );
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_literal_read_write() {
        let mut tree = ScriptTree::new();
        let node = tree.append_literal("compile", "g:a:1.0");
        assert_eq!(tree.literal(node), Some("g:a:1.0"));

        tree.set_literal(node, "g:a:2.0").unwrap();
        assert_eq!(tree.literal(node), Some("g:a:2.0"));
    }

    #[test]
    fn test_set_literal_replaces_template_and_reference() {
        let mut tree = ScriptTree::new();
        let template = tree
            .insert_template(Slot::list("compile"), "g:a:$aVersion")
            .unwrap();
        let reference = tree.insert_reference(Slot::list("compile"), "appcompat").unwrap();
        assert_eq!(tree.value_form(template), Some(ValueForm::Template));
        assert_eq!(tree.literal(template), Some("g:a:$aVersion"));
        assert_eq!(tree.reference(reference), Some("appcompat"));
        assert_eq!(tree.literal(reference), None);

        tree.set_literal(template, "g:a:1.0").unwrap();
        tree.set_literal(reference, "g:b:2.0").unwrap();

        assert_eq!(tree.value_form(template), Some(ValueForm::Plain));
        assert_eq!(tree.value_form(reference), Some(ValueForm::Plain));
        assert_eq!(tree.literal(reference), Some("g:b:2.0"));
        assert_eq!(tree.kind(reference), Some(NodeKind::Literal));
    }

    #[test]
    fn test_set_literal_on_map_fails() {
        let mut tree = ScriptTree::new();
        let node = tree
            .insert_map(Slot::list("compile"), vec![MapEntry::literal("name", "a")])
            .unwrap();
        assert!(matches!(
            tree.set_literal(node, "x"),
            Err(DepsError::NodeKindMismatch { .. })
        ));
    }

    #[test]
    fn test_map_properties() {
        let mut tree = ScriptTree::new();
        let node = tree
            .insert_map(
                Slot::list("compile"),
                vec![
                    MapEntry::literal("group", "g"),
                    MapEntry::reference("name", "artifactName"),
                ],
            )
            .unwrap();

        assert_eq!(tree.property(node, "group"), Some("g"));
        assert_eq!(tree.property(node, "name"), Some("artifactName"));
        assert_eq!(tree.property(node, "version"), None);

        tree.set_property(node, "version", "1.0").unwrap();
        tree.set_property(node, "name", "guava").unwrap();
        let keys: Vec<_> = tree.entries(node).iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["group", "name", "version"]);
        assert_eq!(tree.entries(node)[1].form, ValueForm::Plain);

        assert!(tree.remove_property(node, "group").unwrap());
        assert!(!tree.remove_property(node, "group").unwrap());
        assert_eq!(tree.property(node, "group"), None);
    }

    #[test]
    fn test_call_arguments_and_parent() {
        let (tree, call, first, second) = tree_with_wrapper();
        assert_eq!(tree.callee(call), Some("platform"));
        assert_eq!(tree.arguments(call), vec![first, second]);
        assert_eq!(tree.parent(first), Some(call));
        assert_eq!(tree.parent(call), None);
        assert!(tree.arguments(first).is_empty());
    }

    #[test]
    fn test_add_argument() {
        let (mut tree, call, _, _) = tree_with_wrapper();
        let third = tree.add_argument(call, "g:c:3.0").unwrap();
        assert_eq!(tree.arguments(call).len(), 3);
        assert_eq!(tree.parent(third), Some(call));
    }

    #[test]
    fn test_remove_argument() {
        let (mut tree, call, first, second) = tree_with_wrapper();
        tree.remove_argument(call, first).unwrap();

        assert_eq!(tree.arguments(call), vec![second]);
        assert_eq!(tree.kind(first), None);
        assert_eq!(
            tree.remove_argument(call, first),
            Err(DepsError::NotAnArgument {
                call,
                argument: first
            })
        );
    }

    #[test]
    fn test_remove_from_list_drops_subtree() {
        let (mut tree, call, first, second) = tree_with_wrapper();
        assert!(tree.remove_from_list("api", call));

        assert!(tree.is_empty());
        assert_eq!(tree.kind(first), None);
        assert_eq!(tree.kind(second), None);
        assert!(tree.list_names().is_empty());
    }

    #[test]
    fn test_remove_from_wrong_list_is_noop() {
        let (mut tree, call, _, _) = tree_with_wrapper();
        assert!(!tree.remove_from_list("compile", call));
        assert!(!tree.remove_from_list("api", NodeId::new(99)));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_stale_handle_is_not_reused() {
        let mut tree = ScriptTree::new();
        let old = tree.append_literal("api", "g:a:1");
        assert!(tree.remove_from_list("api", old));
        let new = tree.append_literal("api", "g:b:1");

        assert_ne!(old, new);
        assert_eq!(tree.literal(old), None);
        assert_eq!(tree.set_literal(old, "x"), Err(DepsError::UnknownNode(old)));
    }

    #[test]
    fn test_len_tracks_live_nodes_only() {
        let (mut tree, call, _, _) = tree_with_wrapper();
        let literal = tree.append_literal("compile", "g:c:1.0");
        assert_eq!(tree.len(), 4);

        assert!(tree.remove_from_list("api", call));
        assert_eq!(tree.len(), 1);
        assert!(!tree.remove_from_list("api", call));
        assert_eq!(tree.len(), 1);

        for _ in 0..100 {
            let node = tree.append_literal("compile", "g:d:1.0");
            assert!(tree.remove_from_list("compile", node));
        }
        assert_eq!(tree.len(), 1);
        assert!(tree.remove_from_list("compile", literal));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_property_forms() {
        let mut tree = ScriptTree::new();
        let node = tree
            .insert_map(
                Slot::list("compile"),
                vec![
                    MapEntry::literal("group", "com.squareup"),
                    MapEntry::reference("name", "okioName"),
                    MapEntry::template("version", "$okioVersion"),
                ],
            )
            .unwrap();

        assert_eq!(tree.property_form(node, "group"), Some(ValueForm::Plain));
        assert_eq!(tree.property_form(node, "name"), Some(ValueForm::Reference));
        assert_eq!(tree.property_form(node, "version"), Some(ValueForm::Template));
        assert_eq!(tree.property_form(node, "ext"), None);

        tree.set_property(node, "name", "okio").unwrap();
        assert_eq!(tree.property_form(node, "name"), Some(ValueForm::Plain));
    }

    #[test]
    fn test_variables() {
        let mut tree = ScriptTree::new();
        assert_eq!(tree.variable("guavaVersion"), None);

        tree.define_variable("guavaVersion", "17.0");
        tree.define_variable("guavaVersion", "18.0");
        assert_eq!(tree.variable("guavaVersion"), Some("18.0"));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_closure_survives_literal_write() {
        let mut tree = ScriptTree::new();
        let node = tree.append_literal("compile", "org.hibernate:hibernate:3.1");
        tree.set_closure(node, "{ force = true }").unwrap();
        tree.set_literal(node, "org.hibernate:hibernate:3.0").unwrap();

        assert_eq!(tree.closure(node), Some("{ force = true }"));
        assert!(tree.remove_from_list("compile", node));
        assert_eq!(tree.closure(node), None);
        assert_eq!(
            tree.set_closure(node, "{}"),
            Err(DepsError::UnknownNode(node))
        );
    }

    #[test]
    fn test_document_through_mut_reference() {
        fn append(mut doc: impl ScriptDocument) -> NodeId {
            doc.append_literal("api", "g:a:1")
        }

        let mut tree = ScriptTree::new();
        let node = append(&mut tree);
        assert_eq!(tree.literal(node), Some("g:a:1"));
    }
}
