use crate::pipeline::context::Metadata;
use std::path::PathBuf;

/// Problems found while setting up a parser. Never touches the counters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no patterns registered")]
    NoPatterns,

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern has no named capture group: {0}")]
    NoNamedGroup(String),

    #[error("pattern has an unnamed capture group: {0}")]
    UnnamedGroup(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("invalid filter expression '{0}': expected '<label> <operator> <value>'")]
    FilterSyntax(String),

    #[error("unknown filter operator '{operator}' in '{expr}'")]
    UnknownOperator { expr: String, operator: String },

    #[error("unknown label '{label}' in filter '{expr}'")]
    UnknownLabel { expr: String, label: String },

    #[error("invalid regex in filter '{expr}': {source}")]
    FilterRegex {
        expr: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid number '{literal}' in filter '{expr}'")]
    FilterNumber { expr: String, literal: String },

    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Per-line decode failures. Everything except `Config` is recovered by the driver.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no pattern matched")]
    NoMatch,

    #[error("field without ':' separator: '{0}'")]
    MalformedField(String),

    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DecodeError {
    /// Whether the driver records the line as unmatched and keeps going.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DecodeError::Config(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("cannot compare non-numeric value '{value}' of label '{label}'")]
    NotNumeric { label: String, value: String },
}

/// Errors that end a parse. Only `Cancelled` carries a result.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("handler failed at line {line_number}: {source}")]
    Handler {
        line_number: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("parse cancelled after {} lines", .0.total)]
    Cancelled(Box<Metadata>),
}

impl ParseError {
    /// The metadata accumulated before cancellation.
    pub fn partial(&self) -> Option<&Metadata> {
        match self {
            ParseError::Cancelled(metadata) => Some(&**metadata),
            _ => None,
        }
    }

    pub fn into_partial(self) -> Option<Metadata> {
        match self {
            ParseError::Cancelled(metadata) => Some(*metadata),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ParseError::Cancelled(_))
    }
}
