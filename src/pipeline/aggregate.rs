use crate::pipeline::context::Metadata;

/// Folds per-entry results of a zip archive into one
#[derive(Debug, Default)]
pub struct ResultAggregator {
    aggregate: Metadata,
}

impl ResultAggregator {
    pub fn new(source: impl Into<String>) -> Self {
        ResultAggregator {
            aggregate: Metadata {
                source: source.into(),
                ..Metadata::default()
            },
        }
    }

    /// Add one entry's result. Its errors are expected to be tagged already.
    pub fn fold(&mut self, entry: &str, result: Metadata) {
        let agg = &mut self.aggregate;
        agg.total += result.total;
        agg.matched += result.matched;
        agg.unmatched += result.unmatched;
        agg.excluded += result.excluded;
        agg.skipped += result.skipped;
        agg.elapsed += result.elapsed;
        agg.errors.extend(result.errors);
        agg.zip_entries.push(entry.to_string());
    }

    pub fn entries(&self) -> usize {
        self.aggregate.zip_entries.len()
    }

    pub fn finish(self) -> Metadata {
        self.aggregate
    }
}
