//! Live views over dependency declarations.
//!
//! A [`DependencyView`] binds an artifact to the script node that declares it.
//! Reads and writes go through the host's [`ScriptDocument`]; there is no
//! separate commit step. The view only holds a [`NodeId`], so it must be
//! discarded once its node is removed.
//!
//! Values that name script variables are resolved on read. A map property
//! naming an unknown variable is *unresolved*: it reads as absent, and a view
//! with an unresolved field never matches a concrete spec.

use std::borrow::Cow;

use deps_core::{NodeId, NodeKind, ScriptDocument, ValueForm};

use crate::error::{GradleError, Result};
use crate::notation::{self, SegmentPolicy};
use crate::resolve;
use crate::types::{ArtifactField, ArtifactSpec, ConfigurationName};

/// One map property as read through a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapValue<'a> {
    Absent,
    Resolved(&'a str),
    /// Raw text of a variable reference that could not be resolved
    Unresolved(&'a str),
}

fn map_value<D: ScriptDocument + ?Sized>(doc: &D, node: NodeId, field: ArtifactField) -> MapValue<'_> {
    let key = field.map_key();
    let Some(raw) = doc.property(node, key).filter(|raw| !raw.is_empty()) else {
        return MapValue::Absent;
    };
    let form = doc.property_form(node, key).unwrap_or(ValueForm::Plain);
    match resolve::resolve_borrowed(doc, form, raw).filter(|value| !value.is_empty()) {
        Some(value) => MapValue::Resolved(value),
        None => MapValue::Unresolved(raw),
    }
}

/// Which notation a declaration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotationKind {
    /// `'group:name:version'`
    Compact,
    /// `group: 'g', name: 'n', version: 'v'`
    Map,
}

/// One artifact dependency declared in a configuration.
///
/// # Examples
///
/// ```
/// use deps_core::{ScriptDocument, ScriptTree};
/// use deps_gradle::notation::SegmentPolicy;
/// use deps_gradle::view::DependencyView;
///
/// let mut tree = ScriptTree::new();
/// let node = tree.append_literal("compile", "com.google.guava:guava:18.0");
///
/// let mut view =
///     DependencyView::from_literal(&tree, "compile".into(), node, SegmentPolicy::Lenient)
///         .unwrap();
/// view.set_version(&mut tree, "19.0").unwrap();
///
/// assert_eq!(view.version(&tree), Some("19.0"));
/// assert_eq!(tree.literal(node), Some("com.google.guava:guava:19.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyView {
    /// Literal node holding compact notation, with the parsed spec cached
    Compact {
        node: NodeId,
        configuration: ConfigurationName,
        spec: ArtifactSpec,
    },
    /// Map node; fields are read from its properties on every access
    Map {
        node: NodeId,
        configuration: ConfigurationName,
    },
}

impl DependencyView {
    /// Builds a compact view if the node's value parses as an artifact
    /// notation.
    ///
    /// Templates and references are resolved first; one naming an unknown
    /// variable yields no view.
    pub fn from_literal<D: ScriptDocument + ?Sized>(
        doc: &D,
        configuration: ConfigurationName,
        node: NodeId,
        policy: SegmentPolicy,
    ) -> Option<Self> {
        let form = doc.value_form(node)?;
        let raw = match form {
            ValueForm::Reference => doc.reference(node)?,
            ValueForm::Plain | ValueForm::Template => doc.literal(node)?,
        };
        let Some(text) = resolve::resolve(doc, form, raw) else {
            tracing::trace!(%configuration, %node, raw, "unresolved notation");
            return None;
        };
        let spec = notation::parse_with_policy(&text, policy)?;
        Some(Self::Compact {
            node,
            configuration,
            spec,
        })
    }

    /// Builds a map view if the map has a non-empty `name` property.
    pub fn from_map<D: ScriptDocument + ?Sized>(
        doc: &D,
        configuration: ConfigurationName,
        node: NodeId,
    ) -> Option<Self> {
        if doc.kind(node) != Some(NodeKind::Map) {
            return None;
        }
        doc.property(node, ArtifactField::Name.map_key())
            .filter(|name| !name.is_empty())?;
        Some(Self::Map {
            node,
            configuration,
        })
    }

    pub fn node(&self) -> NodeId {
        match self {
            Self::Compact { node, .. } | Self::Map { node, .. } => *node,
        }
    }

    pub fn configuration(&self) -> &ConfigurationName {
        match self {
            Self::Compact { configuration, .. } | Self::Map { configuration, .. } => configuration,
        }
    }

    pub fn notation(&self) -> NotationKind {
        match self {
            Self::Compact { .. } => NotationKind::Compact,
            Self::Map { .. } => NotationKind::Map,
        }
    }

    /// Reads one field, resolving variables. Empty and unresolved map
    /// properties read as absent.
    pub fn get<'a, D: ScriptDocument + ?Sized>(
        &'a self,
        doc: &'a D,
        field: ArtifactField,
    ) -> Option<&'a str> {
        match self {
            Self::Compact { spec, .. } => spec.get(field),
            Self::Map { node, .. } => match map_value(doc, *node, field) {
                MapValue::Resolved(value) => Some(value),
                MapValue::Absent | MapValue::Unresolved(_) => None,
            },
        }
    }

    /// Fields whose value names a variable the document does not define.
    ///
    /// Always empty for compact views, which only exist once resolved.
    pub fn unresolved_fields<D: ScriptDocument + ?Sized>(&self, doc: &D) -> Vec<ArtifactField> {
        match self {
            Self::Compact { .. } => Vec::new(),
            Self::Map { node, .. } => ArtifactField::ALL
                .into_iter()
                .filter(|&field| matches!(map_value(doc, *node, field), MapValue::Unresolved(_)))
                .collect(),
        }
    }

    pub fn is_resolved<D: ScriptDocument + ?Sized>(&self, doc: &D) -> bool {
        self.unresolved_fields(doc).is_empty()
    }

    pub fn name<'a, D: ScriptDocument + ?Sized>(&'a self, doc: &'a D) -> &'a str {
        self.get(doc, ArtifactField::Name).unwrap_or_default()
    }

    pub fn group<'a, D: ScriptDocument + ?Sized>(&'a self, doc: &'a D) -> Option<&'a str> {
        self.get(doc, ArtifactField::Group)
    }

    pub fn version<'a, D: ScriptDocument + ?Sized>(&'a self, doc: &'a D) -> Option<&'a str> {
        self.get(doc, ArtifactField::Version)
    }

    pub fn classifier<'a, D: ScriptDocument + ?Sized>(&'a self, doc: &'a D) -> Option<&'a str> {
        self.get(doc, ArtifactField::Classifier)
    }

    pub fn extension<'a, D: ScriptDocument + ?Sized>(&'a self, doc: &'a D) -> Option<&'a str> {
        self.get(doc, ArtifactField::Extension)
    }

    /// Snapshot of the current field values.
    ///
    /// `None` when a map view has unresolved fields or its node lost its
    /// name, e.g. after the node was removed through another path.
    pub fn spec<D: ScriptDocument + ?Sized>(&self, doc: &D) -> Option<ArtifactSpec> {
        match self {
            Self::Compact { spec, .. } => Some(spec.clone()),
            Self::Map { .. } if !self.is_resolved(doc) => None,
            Self::Map { .. } => ArtifactSpec::new(
                self.name(doc),
                self.group(doc),
                self.version(doc),
            )
            .ok()
            .map(|spec| {
                spec.with_classifier(self.classifier(doc))
                    .with_extension(self.extension(doc))
            }),
        }
    }

    /// Compact notation of the declaration, built on demand for map views.
    ///
    /// Unresolved map fields show as `${name}` placeholders.
    pub fn compact_notation<D: ScriptDocument + ?Sized>(&self, doc: &D) -> String {
        let Self::Map { node, .. } = self else {
            return self
                .spec(doc)
                .map(|spec| notation::serialize(&spec))
                .unwrap_or_default();
        };
        let read = |field: ArtifactField| match map_value(doc, *node, field) {
            MapValue::Absent => None,
            MapValue::Resolved(value) => Some(Cow::Borrowed(value)),
            MapValue::Unresolved(raw) => Some(Cow::Owned(placeholder(raw))),
        };
        let name = read(ArtifactField::Name).unwrap_or_default();
        let group = read(ArtifactField::Group);
        let version = read(ArtifactField::Version);
        let classifier = read(ArtifactField::Classifier);
        let extension = read(ArtifactField::Extension);
        ArtifactSpec::new(&name, group.as_deref(), version.as_deref())
            .map(|spec| {
                let spec = spec
                    .with_classifier(classifier.as_deref())
                    .with_extension(extension.as_deref());
                notation::serialize(&spec)
            })
            .unwrap_or_default()
    }

    /// Field-wise comparison against a target spec.
    ///
    /// A view with unresolved fields matches nothing.
    pub fn matches<D: ScriptDocument + ?Sized>(&self, doc: &D, target: &ArtifactSpec) -> bool {
        self.is_resolved(doc)
            && ArtifactField::ALL
                .iter()
                .all(|&field| self.get(doc, field) == target.get(field))
    }

    /// Writes one field through to the document.
    ///
    /// `None` or `""` deletes the field. The name cannot be deleted; trying
    /// fails with [`GradleError::MissingName`] and leaves the node untouched.
    ///
    /// Compact views reject values containing notation separators (see
    /// [`notation::check_segment`]) before writing anything. A compact view
    /// over a template or variable reference is rewritten as a plain literal
    /// holding the resolved notation.
    pub fn set_field<D: ScriptDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        field: ArtifactField,
        value: Option<&str>,
    ) -> Result<()> {
        match self {
            Self::Compact { node, spec, .. } => {
                if let Some(value) = value {
                    notation::check_segment(field, value)?;
                }
                let mut updated = spec.clone();
                updated.set(field, value)?;
                let text = notation::serialize(&updated);
                doc.set_literal(*node, &text)?;
                tracing::debug!(node = %node, notation = %text, "rewrote compact notation");
                *spec = updated;
            }
            Self::Map { node, .. } => {
                let key = field.map_key();
                match value.filter(|v| !v.is_empty()) {
                    Some(value) => doc.set_property(*node, key, value)?,
                    None if field == ArtifactField::Name => return Err(GradleError::MissingName),
                    None => {
                        doc.remove_property(*node, key)?;
                    }
                }
                tracing::debug!(node = %node, key, ?value, "updated map property");
            }
        }
        Ok(())
    }

    pub fn set_version<D: ScriptDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        version: &str,
    ) -> Result<()> {
        self.set_field(doc, ArtifactField::Version, Some(version))
    }

    pub fn set_name<D: ScriptDocument + ?Sized>(&mut self, doc: &mut D, name: &str) -> Result<()> {
        self.set_field(doc, ArtifactField::Name, Some(name))
    }

    pub fn set_group<D: ScriptDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        group: Option<&str>,
    ) -> Result<()> {
        self.set_field(doc, ArtifactField::Group, group)
    }

    pub fn set_classifier<D: ScriptDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        classifier: Option<&str>,
    ) -> Result<()> {
        self.set_field(doc, ArtifactField::Classifier, classifier)
    }

    pub fn set_extension<D: ScriptDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        extension: Option<&str>,
    ) -> Result<()> {
        self.set_field(doc, ArtifactField::Extension, extension)
    }
}

/// Display form of an unresolved value: `okioVersion` -> `${okioVersion}`.
fn placeholder(raw: &str) -> String {
    match resolve::sole_placeholder(raw) {
        Some(name) => format!("${{{name}}}"),
        None if raw.contains('$') => raw.to_string(),
        None => format!("${{{raw}}}"),
    }
}
