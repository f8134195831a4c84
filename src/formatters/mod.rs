use crate::pipeline::context::Metadata;

pub mod json;
pub mod logfmt;
pub mod ltsv;
pub mod tsv;

pub use json::JsonFormatter;
pub use logfmt::KeyValueFormatter;
pub use ltsv::LtsvFormatter;
pub use tsv::TsvFormatter;

/// Serializes one decoded line. `labels` and `values` are paired by position.
pub trait LineHandler {
    fn handle(
        &self,
        labels: &[String],
        values: &[String],
        line_number: usize,
        has_line_number: bool,
        is_first: bool,
    ) -> anyhow::Result<String>;
}

impl<F> LineHandler for F
where
    F: Fn(&[String], &[String], usize, bool, bool) -> anyhow::Result<String>,
{
    fn handle(
        &self,
        labels: &[String],
        values: &[String],
        line_number: usize,
        has_line_number: bool,
        is_first: bool,
    ) -> anyhow::Result<String> {
        self(labels, values, line_number, has_line_number, is_first)
    }
}

/// Serializes the run statistics
pub trait MetadataHandler {
    fn handle(&self, metadata: &Metadata) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    #[value(name = "json", help = "JSON Lines (one object per line)")]
    Json,
    #[value(name = "pretty-json", help = "Indented JSON")]
    PrettyJson,
    #[value(name = "key-value", help = "key=\"value\" pairs")]
    KeyValue,
    #[value(name = "ltsv", help = "Labeled tab-separated values")]
    Ltsv,
    #[value(name = "tsv", help = "Tab-separated values with a header line")]
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty-json" => Ok(OutputFormat::PrettyJson),
            "key-value" | "kv" => Ok(OutputFormat::KeyValue),
            "ltsv" => Ok(OutputFormat::Ltsv),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    pub fn line_handler(self) -> Box<dyn LineHandler> {
        match self {
            OutputFormat::Json => Box::new(JsonFormatter::new(false)),
            OutputFormat::PrettyJson => Box::new(JsonFormatter::new(true)),
            OutputFormat::KeyValue => Box::new(KeyValueFormatter),
            OutputFormat::Ltsv => Box::new(LtsvFormatter),
            OutputFormat::Tsv => Box::new(TsvFormatter),
        }
    }

    pub fn metadata_handler(self) -> Box<dyn MetadataHandler> {
        match self {
            OutputFormat::Json => Box::new(JsonFormatter::new(false)),
            OutputFormat::PrettyJson => Box::new(JsonFormatter::new(true)),
            OutputFormat::KeyValue => Box::new(KeyValueFormatter),
            OutputFormat::Ltsv => Box::new(LtsvFormatter),
            OutputFormat::Tsv => Box::new(TsvFormatter),
        }
    }
}

/// Flat counters shared by the non-JSON metadata formats
pub(crate) fn metadata_fields(metadata: &Metadata) -> Vec<(&'static str, String)> {
    vec![
        ("total", metadata.total.to_string()),
        ("matched", metadata.matched.to_string()),
        ("unmatched", metadata.unmatched.to_string()),
        ("excluded", metadata.excluded.to_string()),
        ("skipped", metadata.skipped.to_string()),
        (
            "elapsed",
            humantime::format_duration(metadata.elapsed).to_string(),
        ),
        ("source", metadata.source.clone()),
        ("zip_entries", metadata.zip_entries.join(",")),
        ("errors", metadata.errors.len().to_string()),
    ]
}
