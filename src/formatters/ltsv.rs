use crate::formatters::{metadata_fields, LineHandler, MetadataHandler};
use crate::pipeline::context::Metadata;

/// `label:value` fields separated by tabs
pub struct LtsvFormatter;

fn escape(value: &str) -> String {
    value.replace('\t', "\\t").replace('\n', "\\n")
}

fn join<'a, I: Iterator<Item = (&'a str, &'a str)>>(pairs: I) -> String {
    pairs
        .map(|(label, value)| format!("{}:{}", label, escape(value)))
        .collect::<Vec<_>>()
        .join("\t")
}

impl LineHandler for LtsvFormatter {
    fn handle(
        &self,
        labels: &[String],
        values: &[String],
        _line_number: usize,
        _has_line_number: bool,
        _is_first: bool,
    ) -> anyhow::Result<String> {
        Ok(join(
            labels.iter().map(String::as_str).zip(values.iter().map(String::as_str)),
        ))
    }
}

impl MetadataHandler for LtsvFormatter {
    fn handle(&self, metadata: &Metadata) -> anyhow::Result<String> {
        let fields = metadata_fields(metadata);
        Ok(join(fields.iter().map(|(k, v)| (*k, v.as_str()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{LineDecoder, LtsvDecoder};

    #[test]
    fn test_ltsv_output_decodes_back() {
        let labels = vec!["host".to_string(), "ua".to_string()];
        let values = vec!["10.0.0.1".to_string(), "curl\t7".to_string()];
        let out = LineHandler::handle(&LtsvFormatter, &labels, &values, 1, false, true).unwrap();
        assert_eq!(out, "host:10.0.0.1\tua:curl\\t7");

        let decoded = LtsvDecoder::new().decode(&out).unwrap();
        assert_eq!(decoded.labels, labels);
    }
}
