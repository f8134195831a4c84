use crate::formatters::{metadata_fields, LineHandler, MetadataHandler};
use crate::pipeline::context::Metadata;

/// Tab-separated values. The first record is preceded by a header of labels.
pub struct TsvFormatter;

fn escape(value: &str) -> String {
    value.replace('\t', "\\t").replace('\n', "\\n")
}

impl LineHandler for TsvFormatter {
    fn handle(
        &self,
        labels: &[String],
        values: &[String],
        _line_number: usize,
        _has_line_number: bool,
        is_first: bool,
    ) -> anyhow::Result<String> {
        let row = values.iter().map(|v| escape(v)).collect::<Vec<_>>().join("\t");
        if is_first {
            Ok(format!("{}\n{}", labels.join("\t"), row))
        } else {
            Ok(row)
        }
    }
}

impl MetadataHandler for TsvFormatter {
    fn handle(&self, metadata: &Metadata) -> anyhow::Result<String> {
        let fields = metadata_fields(metadata);
        let header: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        let row: Vec<String> = fields.iter().map(|(_, v)| escape(v)).collect();
        Ok(format!("{}\n{}", header.join("\t"), row.join("\t")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_only_on_first_record() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let values = vec!["1".to_string(), "2".to_string()];
        let first = LineHandler::handle(&TsvFormatter, &labels, &values, 1, false, true).unwrap();
        let second = LineHandler::handle(&TsvFormatter, &labels, &values, 2, false, false).unwrap();
        assert_eq!(first, "a\tb\n1\t2");
        assert_eq!(second, "1\t2");
    }
}
