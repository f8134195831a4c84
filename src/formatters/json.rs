use crate::formatters::{LineHandler, MetadataHandler};
use crate::pipeline::context::Metadata;
use serde_json::{Map, Value};

/// JSON output, one object per record (or indented when `pretty`)
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &Value) -> anyhow::Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

impl LineHandler for JsonFormatter {
    fn handle(
        &self,
        labels: &[String],
        values: &[String],
        _line_number: usize,
        _has_line_number: bool,
        _is_first: bool,
    ) -> anyhow::Result<String> {
        // Map keeps insertion order (preserve_order), so labels stay in decoded order
        let object: Map<String, Value> = labels
            .iter()
            .zip(values)
            .map(|(label, value)| (label.clone(), Value::String(value.clone())))
            .collect();
        self.render(&Value::Object(object))
    }
}

impl MetadataHandler for JsonFormatter {
    fn handle(&self, metadata: &Metadata) -> anyhow::Result<String> {
        self.render(&serde_json::to_value(metadata)?)
    }
}
