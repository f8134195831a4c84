use serde::{Serialize, Serializer};
use std::time::Duration;

/// A line that failed to decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// Zip entry the line came from (empty otherwise)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub entry: String,
    pub line_number: usize,
    pub line: String,
}

/// Per-run statistics
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub excluded: usize,
    pub skipped: usize,
    #[serde(serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
    pub source: String,
    pub zip_entries: Vec<String>,
    pub errors: Vec<ErrorRecord>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the four line classes. Equals `total` once a run is finalized.
    pub fn classified(&self) -> usize {
        self.matched + self.unmatched + self.excluded + self.skipped
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.classified()
    }

    /// Attribute every error record to a zip entry
    pub fn tag_entry(&mut self, entry: &str) {
        for error in &mut self.errors {
            error.entry = entry.to_string();
        }
    }
}

fn serialize_elapsed<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*elapsed).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_json_shape() {
        let metadata = Metadata {
            total: 2,
            matched: 1,
            unmatched: 1,
            elapsed: Duration::from_millis(3),
            source: "access.log".to_string(),
            errors: vec![ErrorRecord {
                entry: String::new(),
                line_number: 2,
                line: "garbage".to_string(),
            }],
            ..Metadata::default()
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["elapsed"], "3ms");
        assert_eq!(json["errors"][0]["line_number"], 2);
        assert!(json["errors"][0].get("entry").is_none());
        assert!(metadata.is_consistent());
    }

    #[test]
    fn test_tag_entry() {
        let mut metadata = Metadata::new();
        metadata.errors.push(ErrorRecord {
            entry: String::new(),
            line_number: 1,
            line: "x".to_string(),
        });
        metadata.tag_entry("a.log");
        assert_eq!(metadata.errors[0].entry, "a.log");
    }
}
