//! Resolution of script variables used inside declarations.
//!
//! Gradle scripts often keep versions and whole notations in variables:
//!
//! ```groovy
//! ext {
//!     guavaVersion = '18.0'
//! }
//! dependencies {
//!     compile "com.google.guava:guava:$guavaVersion"
//!     compile group: 'com.squareup', name: 'okio', version: okioVersion
//! }
//! ```
//!
//! Values are resolved against [`ScriptDocument::variable`]. A value naming a
//! variable the document does not know stays unresolved and never compares
//! equal to a concrete artifact.

use std::borrow::Cow;

use deps_core::{ScriptDocument, ValueForm};
use once_cell::sync::Lazy;
use regex::Regex;

/// `$name`, `$a.b` or `${name}` inside a double-quoted string.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}|([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*))")
        .unwrap()
});

/// Qualifiers that address the same extra-properties namespace.
const EXT_PREFIXES: &[&str] = &["rootProject.ext.", "project.ext.", "ext."];

/// Looks up a variable, accepting `ext.`-qualified spellings.
///
/// # Examples
///
/// ```
/// use deps_core::ScriptTree;
/// use deps_gradle::resolve::lookup;
///
/// let mut tree = ScriptTree::new();
/// tree.define_variable("guavaVersion", "18.0");
///
/// assert_eq!(lookup(&tree, "guavaVersion"), Some("18.0"));
/// assert_eq!(lookup(&tree, "rootProject.ext.guavaVersion"), Some("18.0"));
/// assert_eq!(lookup(&tree, "okioVersion"), None);
/// ```
pub fn lookup<'a, D: ScriptDocument + ?Sized>(doc: &'a D, name: &str) -> Option<&'a str> {
    doc.variable(name)
        .or_else(|| strip_ext_prefix(name).and_then(|short| doc.variable(short)))
}

/// `ext.okioVersion` -> `okioVersion`; `None` for unqualified names.
pub fn strip_ext_prefix(name: &str) -> Option<&str> {
    EXT_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .filter(|short| !short.is_empty())
}

/// Substitutes every placeholder of a template. `None` if any is unknown.
pub fn interpolate<D: ScriptDocument + ?Sized>(doc: &D, template: &str) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(template) {
        let whole = captures.get(0)?;
        let name = captures.get(1).or_else(|| captures.get(2))?.as_str();
        out.push_str(&template[last..whole.start()]);
        out.push_str(lookup(doc, name)?);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Some(out)
}

/// Variable name of a template that is exactly one placeholder (`"$v"`).
pub fn sole_placeholder(template: &str) -> Option<&str> {
    let captures = PLACEHOLDER.captures(template)?;
    let whole = captures.get(0)?;
    if whole.start() != 0 || whole.end() != template.len() {
        return None;
    }
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|name| name.as_str())
}

/// Resolves a scalar as written in the script.
pub fn resolve<'a, D: ScriptDocument + ?Sized>(
    doc: &'a D,
    form: ValueForm,
    raw: &'a str,
) -> Option<Cow<'a, str>> {
    match form {
        ValueForm::Plain => Some(Cow::Borrowed(raw)),
        ValueForm::Reference => lookup(doc, raw).map(Cow::Borrowed),
        ValueForm::Template => interpolate(doc, raw).map(Cow::Owned),
    }
}

/// Like [`resolve`], but only for values that resolve without allocating.
///
/// Templates qualify when they consist of a single placeholder; any other
/// template reads as unresolved.
pub fn resolve_borrowed<'a, D: ScriptDocument + ?Sized>(
    doc: &'a D,
    form: ValueForm,
    raw: &'a str,
) -> Option<&'a str> {
    match form {
        ValueForm::Plain => Some(raw),
        ValueForm::Reference => lookup(doc, raw),
        ValueForm::Template => sole_placeholder(raw).and_then(|name| lookup(doc, name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deps_core::ScriptTree;

    fn variables() -> ScriptTree {
        let mut tree = ScriptTree::new();
        tree.define_variable("guavaVersion", "18.0");
        tree.define_variable("supportGroup", "com.android.support");
        tree
    }

    #[test]
    fn test_interpolate_both_placeholder_styles() {
        let tree = variables();
        assert_eq!(
            interpolate(&tree, "com.google.guava:guava:$guavaVersion").as_deref(),
            Some("com.google.guava:guava:18.0")
        );
        assert_eq!(
            interpolate(&tree, "${supportGroup}:appcompat-v7:${ ext.guavaVersion }@aar").as_deref(),
            Some("com.android.support:appcompat-v7:18.0@aar")
        );
        assert_eq!(interpolate(&tree, "no placeholders").as_deref(), Some("no placeholders"));
    }

    #[test]
    fn test_unknown_placeholder_is_unresolved() {
        let tree = variables();
        assert_eq!(interpolate(&tree, "com.squareup:okio:$okioVersion"), None);
        assert_eq!(
            resolve(&tree, ValueForm::Reference, "okioVersion"),
            None
        );
    }

    #[test]
    fn test_sole_placeholder() {
        assert_eq!(sole_placeholder("$guavaVersion"), Some("guavaVersion"));
        assert_eq!(sole_placeholder("${guavaVersion}"), Some("guavaVersion"));
        assert_eq!(sole_placeholder("1.$minor"), None);
        assert_eq!(sole_placeholder("18.0"), None);
    }

    #[test]
    fn test_resolve_by_form() {
        let tree = variables();
        assert_eq!(
            resolve(&tree, ValueForm::Plain, "guavaVersion").as_deref(),
            Some("guavaVersion")
        );
        assert_eq!(
            resolve_borrowed(&tree, ValueForm::Reference, "guavaVersion"),
            Some("18.0")
        );
        assert_eq!(
            resolve_borrowed(&tree, ValueForm::Template, "${guavaVersion}"),
            Some("18.0")
        );
        assert_eq!(resolve_borrowed(&tree, ValueForm::Template, "v$guavaVersion"), None);
        assert_eq!(
            resolve(&tree, ValueForm::Template, "v$guavaVersion").as_deref(),
            Some("v18.0")
        );
    }
}
