//! Script document tree contract.
//!
//! The dependency model never owns the build script. It reads and writes the
//! host's document through [`ScriptDocument`], addressing nodes by [`NodeId`]
//! handles. A handle stays valid until its node is removed; after that every
//! read through it returns `None` and every write fails with
//! [`DepsError::UnknownNode`](crate::DepsError::UnknownNode).

use std::fmt;

use crate::error::Result;

/// Opaque handle to a node of a script document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Expression kinds the dependency model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Scalar string literal (`'com.google.guava:guava:18.0'`)
    Literal,
    /// Key/value map (`group: 'g', name: 'n'`)
    Map,
    /// Method call with an argument list (`project(':lib')`)
    Call,
    /// Any other expression, e.g. a variable or property access
    Reference,
}

impl NodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Map => "map",
            Self::Call => "call",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scalar value is spelled in the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueForm {
    /// String literal without placeholders
    Plain,
    /// Double-quoted string with `$name` or `${name}` placeholders
    Template,
    /// Bare identifier or property path (`guavaVersion`, `ext.okio`)
    Reference,
}

/// Position a new node is inserted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// End of the named configuration's declaration list
    List(String),
    /// End of a call's argument list
    Argument(NodeId),
}

impl Slot {
    pub fn list(name: impl Into<String>) -> Self {
        Self::List(name.into())
    }
}

/// Contract a host script document must satisfy.
///
/// Lists are keyed by configuration name and keep insertion order. Nodes in
/// a list have no parent; call arguments report the call as their parent.
///
/// Implementations are not expected to synchronize access. Callers hold
/// whatever lock or transaction the host requires around every write.
pub trait ScriptDocument {
    /// Kind of the node, `None` if it no longer exists.
    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Enclosing call of an argument node.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Unquoted text of a literal node. Template placeholders are kept as
    /// written.
    fn literal(&self, node: NodeId) -> Option<&str>;

    /// Replaces a literal or reference node with a plain string literal.
    fn set_literal(&mut self, node: NodeId, text: &str) -> Result<()>;

    /// Source text of a reference node.
    fn reference(&self, node: NodeId) -> Option<&str>;

    /// Spelling of a literal or reference node, `None` for any other kind.
    fn value_form(&self, node: NodeId) -> Option<ValueForm>;

    /// Raw value of a map property, as written.
    fn property(&self, node: NodeId, key: &str) -> Option<&str>;

    /// Spelling of a map property's value.
    fn property_form(&self, node: NodeId, key: &str) -> Option<ValueForm>;

    /// Writes a map property as a plain string, appending it if absent.
    fn set_property(&mut self, node: NodeId, key: &str, value: &str) -> Result<()>;

    /// Removes a map property. Returns whether it existed.
    fn remove_property(&mut self, node: NodeId, key: &str) -> Result<bool>;

    /// Method name of a call node.
    fn callee(&self, node: NodeId) -> Option<&str>;

    /// Ordered arguments of a call node. Empty for any other kind.
    fn arguments(&self, node: NodeId) -> Vec<NodeId>;

    /// Appends a literal argument to a call.
    fn add_argument(&mut self, call: NodeId, text: &str) -> Result<NodeId>;

    /// Removes one argument (and its subtree) from a call.
    fn remove_argument(&mut self, call: NodeId, argument: NodeId) -> Result<()>;

    /// Configuration names in first-declaration order.
    fn list_names(&self) -> Vec<String>;

    /// Nodes declared directly in the named list.
    fn list(&self, name: &str) -> Vec<NodeId>;

    /// Appends a literal node, creating the list if needed.
    fn append_literal(&mut self, name: &str, text: &str) -> NodeId;

    /// Removes a node (and its subtree) from the named list.
    /// Returns `false` if the node was not in that list.
    fn remove_from_list(&mut self, name: &str, node: NodeId) -> bool;

    /// String value of a script variable (`ext.name = '...'`, `def name = '...'`).
    ///
    /// Hosts that do not track variables leave every reference unresolved.
    fn variable(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl<T: ScriptDocument + ?Sized> ScriptDocument for &mut T {
    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        (**self).kind(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        (**self).parent(node)
    }

    fn literal(&self, node: NodeId) -> Option<&str> {
        (**self).literal(node)
    }

    fn set_literal(&mut self, node: NodeId, text: &str) -> Result<()> {
        (**self).set_literal(node, text)
    }

    fn reference(&self, node: NodeId) -> Option<&str> {
        (**self).reference(node)
    }

    fn value_form(&self, node: NodeId) -> Option<ValueForm> {
        (**self).value_form(node)
    }

    fn property(&self, node: NodeId, key: &str) -> Option<&str> {
        (**self).property(node, key)
    }

    fn property_form(&self, node: NodeId, key: &str) -> Option<ValueForm> {
        (**self).property_form(node, key)
    }

    fn set_property(&mut self, node: NodeId, key: &str, value: &str) -> Result<()> {
        (**self).set_property(node, key, value)
    }

    fn remove_property(&mut self, node: NodeId, key: &str) -> Result<bool> {
        (**self).remove_property(node, key)
    }

    fn callee(&self, node: NodeId) -> Option<&str> {
        (**self).callee(node)
    }

    fn arguments(&self, node: NodeId) -> Vec<NodeId> {
        (**self).arguments(node)
    }

    fn add_argument(&mut self, call: NodeId, text: &str) -> Result<NodeId> {
        (**self).add_argument(call, text)
    }

    fn remove_argument(&mut self, call: NodeId, argument: NodeId) -> Result<()> {
        (**self).remove_argument(call, argument)
    }

    fn list_names(&self) -> Vec<String> {
        (**self).list_names()
    }

    fn list(&self, name: &str) -> Vec<NodeId> {
        (**self).list(name)
    }

    fn append_literal(&mut self, name: &str, text: &str) -> NodeId {
        (**self).append_literal(name, text)
    }

    fn remove_from_list(&mut self, name: &str, node: NodeId) -> bool {
        (**self).remove_from_list(name, node)
    }

    fn variable(&self, name: &str) -> Option<&str> {
        (**self).variable(name)
    }
}
