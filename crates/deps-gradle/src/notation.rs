//! Compact dependency notation codec.
//!
//! Compact notation packs an artifact into one string:
//! `group:name:version:classifier@extension`, where any subset of the fields
//! may be present. Parsing is deliberately forgiving: text that does not
//! resolve to a name yields `None` rather than an error, so callers can treat
//! the declaration as opaque.

use serde::Deserialize;

use crate::error::{GradleError, Result};
use crate::types::{ArtifactField, ArtifactSpec};

/// How to treat notations with more than four colon-delimited segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentPolicy {
    /// Ignore the extra segments
    #[default]
    Lenient,
    /// Reject the notation
    Strict,
}

/// Parses compact notation with [`SegmentPolicy::Lenient`].
///
/// # Examples
///
/// ```
/// use deps_gradle::notation::parse;
///
/// let spec = parse("foo:1.0").unwrap();
/// assert_eq!(spec.name(), "foo");
/// assert_eq!(spec.version(), Some("1.0"));
/// assert_eq!(spec.group(), None);
///
/// let spec = parse("com.example:foo").unwrap();
/// assert_eq!(spec.group(), Some("com.example"));
/// assert_eq!(spec.name(), "foo");
///
/// assert!(parse(" : ").is_none());
/// ```
pub fn parse(text: &str) -> Option<ArtifactSpec> {
    parse_with_policy(text, SegmentPolicy::Lenient)
}

/// Parses compact notation.
///
/// Segments are trimmed and empty ones dropped. The first `@` of the last
/// segment starts the extension. Two segments read as `name:version` when
/// the second starts with a digit and as `group:name` otherwise.
pub fn parse_with_policy(text: &str, policy: SegmentPolicy) -> Option<ArtifactSpec> {
    let mut segments: Vec<&str> = text
        .split(':')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    let last = segments.pop()?;
    let extension = match last.split_once('@') {
        Some((head, extension)) => {
            let head = head.trim();
            if !head.is_empty() {
                segments.push(head);
            }
            Some(extension.trim())
        }
        None => {
            segments.push(last);
            None
        }
    };

    if policy == SegmentPolicy::Strict && segments.len() > 4 {
        tracing::debug!(notation = text, segments = segments.len(), "rejecting notation");
        return None;
    }

    let (group, name, version, classifier) = match segments.as_slice() {
        [] => return None,
        [name] => (None, *name, None, None),
        [first, second] => {
            if second.starts_with(|c: char| c.is_ascii_digit()) {
                (None, *first, Some(*second), None)
            } else {
                (Some(*first), *second, None, None)
            }
        }
        [group, name, version] => (Some(*group), *name, Some(*version), None),
        [group, name, version, classifier, ..] => {
            (Some(*group), *name, Some(*version), Some(*classifier))
        }
    };

    ArtifactSpec::new(name, group, version)
        .ok()
        .map(|spec| spec.with_classifier(classifier).with_extension(extension))
}

/// Serializes a spec to compact notation.
///
/// Absent fields are skipped rather than rendered as empty segments.
///
/// # Examples
///
/// ```
/// use deps_gradle::{ArtifactSpec, notation::serialize};
///
/// let spec = ArtifactSpec::new("service", Some("org.gradle"), Some("1.0"))
///     .unwrap()
///     .with_extension(Some("jar"));
/// assert_eq!(serialize(&spec), "org.gradle:service:1.0@jar");
/// ```
pub fn serialize(spec: &ArtifactSpec) -> String {
    let mut notation = [
        spec.group(),
        Some(spec.name()),
        spec.version(),
        spec.classifier(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(":");

    if let Some(extension) = spec.extension() {
        notation.push('@');
        notation.push_str(extension);
    }
    notation
}

/// Checks that a value fits its compact segment without changing how the
/// notation splits.
///
/// `:` separates segments and `@` starts the extension, so neither may
/// appear in group, name, version or classifier. The extension may contain
/// `@` but not `:`.
///
/// # Examples
///
/// ```
/// use deps_gradle::{ArtifactField, notation::check_segment};
///
/// assert!(check_segment(ArtifactField::Group, "com.squareup").is_ok());
/// assert!(check_segment(ArtifactField::Group, "a:b").is_err());
/// assert!(check_segment(ArtifactField::Version, "1.0@aar").is_err());
/// ```
pub fn check_segment(field: ArtifactField, value: &str) -> Result<()> {
    let forbidden: &[char] = if field == ArtifactField::Extension { &[':'] } else { &[':', '@'] };
    if value.contains(forbidden) {
        tracing::debug!(?field, value, "value does not fit compact notation");
        return Err(GradleError::invalid_notation(value));
    }
    Ok(())
}

/// Checks every field of a spec with [`check_segment`].
pub fn check_compact(spec: &ArtifactSpec) -> Result<()> {
    ArtifactField::ALL.iter().try_for_each(|&field| match spec.get(field) {
        Some(value) => check_segment(field, value),
        None => Ok(()),
    })
}
