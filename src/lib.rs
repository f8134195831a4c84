// src/lib.rs
pub mod colors;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod formatters;
pub mod patterns;
pub mod pipeline;
pub mod report;
pub mod source;

pub use error::*;
pub use pipeline::*;

pub use decoder::{Decoded, LineDecoder, LtsvDecoder, RegexDecoder};
pub use filter::{Filter, FilterSet, Operator};
pub use formatters::{LineHandler, MetadataHandler, OutputFormat};
pub use source::SourceKind;
