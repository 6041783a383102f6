//! Types for Gradle dependency declarations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradleError, Result};
use crate::notation;

/// Canonical, notation-independent description of one artifact dependency.
///
/// Optional fields never hold empty strings: every constructor and mutator
/// turns `""` into `None`, so two specs compare equal exactly when all five
/// fields match.
///
/// # Examples
///
/// ```
/// use deps_gradle::ArtifactSpec;
///
/// let spec = ArtifactSpec::new("guava", Some("com.google.guava"), Some("18.0"))
///     .unwrap()
///     .with_classifier(Some(""));
///
/// assert_eq!(spec.group(), Some("com.google.guava"));
/// assert_eq!(spec.classifier(), None);
/// assert_eq!(spec.to_string(), "com.google.guava:guava:18.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawArtifactSpec")]
pub struct ArtifactSpec {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extension: Option<String>,
}

#[derive(Deserialize)]
struct RawArtifactSpec {
    name: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    classifier: Option<String>,
    #[serde(default)]
    extension: Option<String>,
}

impl TryFrom<RawArtifactSpec> for ArtifactSpec {
    type Error = GradleError;

    fn try_from(raw: RawArtifactSpec) -> Result<Self> {
        Ok(Self::new(&raw.name, raw.group.as_deref(), raw.version.as_deref())?
            .with_classifier(raw.classifier.as_deref())
            .with_extension(raw.extension.as_deref()))
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl ArtifactSpec {
    /// Creates a spec. Fails with [`GradleError::MissingName`] if `name` is empty.
    pub fn new(name: &str, group: Option<&str>, version: Option<&str>) -> Result<Self> {
        if name.is_empty() {
            return Err(GradleError::MissingName);
        }
        Ok(Self {
            name: name.to_string(),
            group: normalize(group),
            version: normalize(version),
            classifier: None,
            extension: None,
        })
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Option<&str>) -> Self {
        self.classifier = normalize(classifier);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: Option<&str>) -> Self {
        self.extension = normalize(extension);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Reads one field by tag.
    pub fn get(&self, field: ArtifactField) -> Option<&str> {
        match field {
            ArtifactField::Name => Some(&self.name),
            ArtifactField::Group => self.group(),
            ArtifactField::Version => self.version(),
            ArtifactField::Classifier => self.classifier(),
            ArtifactField::Extension => self.extension(),
        }
    }

    /// Replaces one field. `None` or `""` clears an optional field; the name
    /// cannot be cleared.
    pub fn set(&mut self, field: ArtifactField, value: Option<&str>) -> Result<()> {
        let value = normalize(value);
        match field {
            ArtifactField::Name => self.name = value.ok_or(GradleError::MissingName)?,
            ArtifactField::Group => self.group = value,
            ArtifactField::Version => self.version = value,
            ArtifactField::Classifier => self.classifier = value,
            ArtifactField::Extension => self.extension = value,
        }
        Ok(())
    }
}

impl fmt::Display for ArtifactSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&notation::serialize(self))
    }
}

impl FromStr for ArtifactSpec {
    type Err = GradleError;

    fn from_str(s: &str) -> Result<Self> {
        notation::parse(s).ok_or_else(|| GradleError::invalid_notation(s))
    }
}

/// Field of an artifact declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactField {
    Name,
    Group,
    Version,
    Classifier,
    Extension,
}

impl ArtifactField {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Group,
        Self::Version,
        Self::Classifier,
        Self::Extension,
    ];

    /// Property key used by map notation (`ext` for the extension).
    pub const fn map_key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Group => "group",
            Self::Version => "version",
            Self::Classifier => "classifier",
            Self::Extension => "ext",
        }
    }
}

/// Name of a dependency configuration (`implementation`, `testCompile`, ...).
///
/// Any name is accepted since build scripts may declare custom
/// configurations; see [`configuration_names`] for the common ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationName(String);

impl ConfigurationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the [`configuration_names`] constants.
    pub fn is_well_known(&self) -> bool {
        configuration_names::ALL.contains(&self.0.as_str())
    }
}

impl fmt::Display for ConfigurationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConfigurationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConfigurationName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ConfigurationName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for ConfigurationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ConfigurationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Commonly used configuration names, including legacy ones.
pub mod configuration_names {
    pub const COMPILE: &str = "compile";
    pub const API: &str = "api";
    pub const IMPLEMENTATION: &str = "implementation";
    pub const COMPILE_ONLY: &str = "compileOnly";
    pub const RUNTIME: &str = "runtime";
    pub const RUNTIME_ONLY: &str = "runtimeOnly";
    pub const CLASSPATH: &str = "classpath";
    pub const TEST_COMPILE: &str = "testCompile";
    pub const TEST_IMPLEMENTATION: &str = "testImplementation";
    pub const TEST_RUNTIME: &str = "testRuntime";
    pub const ANDROID_TEST_COMPILE: &str = "androidTestCompile";
    pub const ANDROID_TEST_IMPLEMENTATION: &str = "androidTestImplementation";
    pub const ANNOTATION_PROCESSOR: &str = "annotationProcessor";
    pub const KAPT: &str = "kapt";

    pub const ALL: &[&str] = &[
        COMPILE,
        API,
        IMPLEMENTATION,
        COMPILE_ONLY,
        RUNTIME,
        RUNTIME_ONLY,
        CLASSPATH,
        TEST_COMPILE,
        TEST_IMPLEMENTATION,
        TEST_RUNTIME,
        ANDROID_TEST_COMPILE,
        ANDROID_TEST_IMPLEMENTATION,
        ANNOTATION_PROCESSOR,
        KAPT,
    ];
}
