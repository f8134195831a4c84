use crate::formatters::{metadata_fields, LineHandler, MetadataHandler};
use crate::pipeline::context::Metadata;

/// `key="value"` pairs separated by spaces
pub struct KeyValueFormatter;

impl KeyValueFormatter {
    /// Format a single key="value" pair
    pub fn format_key_value_pair(key: &str, value: &str) -> String {
        format!("{}=\"{}\"", key, Self::escape_quotes(value))
    }

    fn escape_quotes(value: &str) -> String {
        value.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

impl LineHandler for KeyValueFormatter {
    fn handle(
        &self,
        labels: &[String],
        values: &[String],
        _line_number: usize,
        _has_line_number: bool,
        _is_first: bool,
    ) -> anyhow::Result<String> {
        let pairs: Vec<String> = labels
            .iter()
            .zip(values)
            .map(|(key, value)| Self::format_key_value_pair(key, value))
            .collect();
        Ok(pairs.join(" "))
    }
}

impl MetadataHandler for KeyValueFormatter {
    fn handle(&self, metadata: &Metadata) -> anyhow::Result<String> {
        let pairs: Vec<String> = metadata_fields(metadata)
            .iter()
            .map(|(key, value)| Self::format_key_value_pair(key, value))
            .collect();
        Ok(pairs.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(
            KeyValueFormatter::format_key_value_pair("ua", r#"say "hi"\"#),
            r#"ua="say \"hi\"\\""#
        );
    }

    #[test]
    fn test_metadata_pairs() {
        let metadata = Metadata {
            total: 3,
            matched: 3,
            source: "a.log".to_string(),
            ..Metadata::default()
        };
        let out = MetadataHandler::handle(&KeyValueFormatter, &metadata).unwrap();
        assert!(out.starts_with(r#"total="3" matched="3" unmatched="0""#));
        assert!(out.contains(r#"source="a.log""#));
        assert!(out.ends_with(r#"errors="0""#));
    }
}
