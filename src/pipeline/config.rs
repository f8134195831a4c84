use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Label prepended to every record when line numbering is on
pub const LINE_NUMBER_LABEL: &str = "no";

/// Configuration for parser behavior
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Allow-list of output labels (empty keeps all)
    pub labels: Vec<String>,
    /// Filter expressions, AND-ed
    pub filters: Vec<String>,
    /// 1-based line numbers to skip before decoding
    pub skip_lines: Vec<usize>,
    pub line_number: bool,
    /// Prefix written lines with match/unmatch markers
    pub markers: bool,
    /// Write unmatched raw lines to the output too
    pub echo_unmatched: bool,
    /// Colour the markers
    pub color: bool,
}

impl ParserConfig {
    pub fn skip_set(&self) -> SkipSet {
        SkipSet::new(self.skip_lines.iter().copied())
    }
}

/// Contents of a YAML config file: parser settings plus regex patterns
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub patterns: Vec<String>,
    #[serde(flatten)]
    pub parser: ParserConfig,
}

impl ConfigFile {
    pub fn from_yaml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content, path)
    }
}

/// Distinct 1-based line numbers excluded from processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<usize>);

impl SkipSet {
    pub fn new<I: IntoIterator<Item = usize>>(lines: I) -> Self {
        SkipSet(lines.into_iter().filter(|&n| n > 0).collect())
    }

    pub fn contains(&self, line_number: usize) -> bool {
        self.0.contains(&line_number)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
