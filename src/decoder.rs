// src/decoder.rs - Line decoders (regex and LTSV)

use crate::error::{ConfigError, DecodeError};
use regex::Regex;

/// A decoded line: labels and values paired by position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub labels: Vec<String>,
    pub values: Vec<String>,
}

impl Decoded {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.values[i].as_str())
    }

    /// Keep only labels in `allow`, in decoded order. Empty `allow` keeps everything.
    pub fn select(self, allow: &[String]) -> Decoded {
        if allow.is_empty() {
            return self;
        }
        let (labels, values) = self
            .labels
            .into_iter()
            .zip(self.values)
            .filter(|(label, _)| allow.contains(label))
            .unzip();
        Decoded { labels, values }
    }
}

/// Converts one raw line into ordered (label, value) pairs
pub trait LineDecoder {
    fn decode(&self, line: &str) -> Result<Decoded, DecodeError>;

    /// Labels this decoder can produce, when known up front
    fn labels(&self) -> Option<Vec<String>> {
        None
    }

    fn name(&self) -> &str;
}

/// Multi-pattern regex decoder. Patterns are tried in declaration order and
/// the first one that matches wins.
#[derive(Debug, Clone)]
pub struct RegexDecoder {
    patterns: Vec<Regex>,
}

impl RegexDecoder {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        if patterns.is_empty() {
            return Err(ConfigError::NoPatterns);
        }

        let patterns = patterns
            .iter()
            .map(|p| Self::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RegexDecoder { patterns })
    }

    /// Compile one pattern and check its capture groups
    fn compile(pattern: &str) -> Result<Regex, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        // Group 0 is the implicit whole match and is always unnamed
        let mut named = 0;
        for name in regex.capture_names().skip(1) {
            match name {
                Some(_) => named += 1,
                None => return Err(ConfigError::UnnamedGroup(pattern.to_string())),
            }
        }
        if named == 0 {
            return Err(ConfigError::NoNamedGroup(pattern.to_string()));
        }

        Ok(regex)
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

impl LineDecoder for RegexDecoder {
    fn decode(&self, line: &str) -> Result<Decoded, DecodeError> {
        for regex in &self.patterns {
            let Some(captures) = regex.captures(line) else {
                continue;
            };

            let mut decoded = Decoded::default();
            for (i, name) in regex.capture_names().enumerate().skip(1) {
                if let Some(name) = name {
                    decoded.labels.push(name.to_string());
                    decoded.values.push(
                        captures
                            .get(i)
                            .map(|m| m.as_str().to_string())
                            .unwrap_or_default(),
                    );
                }
            }
            return Ok(decoded);
        }

        Err(DecodeError::NoMatch)
    }

    fn labels(&self) -> Option<Vec<String>> {
        let mut labels: Vec<String> = Vec::new();
        for name in self.patterns.iter().flat_map(|r| r.capture_names().flatten()) {
            if !labels.iter().any(|l| l == name) {
                labels.push(name.to_string());
            }
        }
        Some(labels)
    }

    fn name(&self) -> &str {
        "regex"
    }
}

/// Labeled Tab-separated Values decoder
#[derive(Debug, Clone, Default)]
pub struct LtsvDecoder;

impl LtsvDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl LineDecoder for LtsvDecoder {
    fn decode(&self, line: &str) -> Result<Decoded, DecodeError> {
        let mut decoded = Decoded::default();

        for field in line.split('\t') {
            let (label, value) = field
                .split_once(':')
                .ok_or_else(|| DecodeError::MalformedField(field.to_string()))?;

            if decoded.labels.iter().any(|l| l == label) {
                return Err(DecodeError::DuplicateLabel(label.to_string()));
            }
            decoded.labels.push(label.to_string());
            decoded.values.push(value.to_string());
        }

        Ok(decoded)
    }

    fn name(&self) -> &str {
        "ltsv"
    }
}
