use serde::Deserialize;

use crate::error::{GradleError, Result};
use crate::notation::SegmentPolicy;

/// Root configuration for the dependency model.
///
/// Hosts usually pass this as JSON alongside their own settings. All fields
/// use sensible defaults if not specified.
///
/// # Examples
///
/// ```
/// use deps_gradle::config::{GradleModelConfig, QuoteStyle};
/// use deps_gradle::notation::SegmentPolicy;
///
/// let json = r#"{
///     "segment_policy": "strict",
///     "extra_excluded_callees": ["gradleApi"],
///     "formatter": { "quote_style": "double" }
/// }"#;
///
/// let config = GradleModelConfig::from_json(json).unwrap();
/// assert_eq!(config.segment_policy, SegmentPolicy::Strict);
/// assert_eq!(config.formatter.quote_style, QuoteStyle::Double);
/// assert_eq!(config.formatter.indent, 4);
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GradleModelConfig {
    #[serde(default)]
    pub segment_policy: SegmentPolicy,
    /// Call names treated as non-artifact notations in addition to the
    /// built-in `project`, `fileTree` and `files`
    #[serde(default)]
    pub extra_excluded_callees: Vec<String>,
    #[serde(default)]
    pub formatter: FormatterConfig,
}

impl GradleModelConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| GradleError::Config { source })
    }
}

/// Configuration for rendering a dependencies block back to script text.
///
/// # Defaults
///
/// - `quote_style`: single quotes
/// - `indent`: 4 spaces
#[derive(Debug, Clone, Deserialize)]
pub struct FormatterConfig {
    #[serde(default)]
    pub quote_style: QuoteStyle,
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            quote_style: QuoteStyle::default(),
            indent: default_indent(),
        }
    }
}

/// Quote character used for string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    #[default]
    Single,
    Double,
}

impl QuoteStyle {
    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

const fn default_indent() -> usize {
    4
}
