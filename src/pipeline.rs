// src/pipeline.rs
pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod context;
pub mod stream;

pub use aggregate::ResultAggregator;
pub use cancel::CancelToken;
pub use config::{ConfigFile, ParserConfig, SkipSet, LINE_NUMBER_LABEL};
pub use context::{ErrorRecord, Metadata};
pub use stream::{Parser, MATCH_MARKER, UNMATCH_MARKER};
