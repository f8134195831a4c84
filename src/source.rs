// src/source.rs - Input sources feeding the parser

use crate::error::{ConfigError, ParseError};
use crate::pipeline::aggregate::ResultAggregator;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::context::Metadata;
use crate::pipeline::stream::Parser;
use flate2::read::MultiGzDecoder;
use glob::MatchOptions;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;

/// `*` and `?` stay within one path segment of a zip entry name
const ENTRY_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// How a file on disk should be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Plain,
    Gzip,
    Zip,
}

impl SourceKind {
    /// Guess from the file extension
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => SourceKind::Gzip,
            Some(ext) if ext.eq_ignore_ascii_case("zip") => SourceKind::Zip,
            _ => SourceKind::Plain,
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn open(path: &Path) -> Result<File, ParseError> {
    File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })
}

impl Parser {
    pub fn parse_string<W: Write>(&self, input: &str, output: &mut W) -> Result<Metadata, ParseError> {
        self.parse(Cursor::new(input), output)
    }

    /// Raw byte stream, no cancellation
    pub fn parse_reader<R: Read, W: Write>(
        &self,
        input: R,
        output: &mut W,
    ) -> Result<Metadata, ParseError> {
        self.parse(BufReader::new(input), output)
    }

    /// Raw byte stream that can be stopped between lines. A cancelled run
    /// returns `ParseError::Cancelled` holding the partial metadata.
    pub fn parse_stream<R: Read, W: Write>(
        &self,
        input: R,
        output: &mut W,
        cancel: &CancelToken,
    ) -> Result<Metadata, ParseError> {
        self.parse_with_cancel(BufReader::new(input), output, cancel)
    }

    pub fn parse_file<W: Write>(&self, path: &Path, output: &mut W) -> Result<Metadata, ParseError> {
        let file = open(path)?;
        let mut metadata = self.parse(BufReader::new(file), output)?;
        metadata.source = base_name(path);
        Ok(metadata)
    }

    /// Every gzip member in the file is decoded in order
    pub fn parse_gzip<W: Write>(&self, path: &Path, output: &mut W) -> Result<Metadata, ParseError> {
        let file = open(path)?;
        // Rotated logs are often concatenated, one gzip member each
        let decoder = MultiGzDecoder::new(file);
        let mut metadata = self.parse(BufReader::new(decoder), output)?;
        metadata.source = base_name(path);
        Ok(metadata)
    }

    /// Parse every entry whose name matches `pattern`, in archive order, and
    /// fold the per-entry results into one.
    pub fn parse_zip<W: Write>(
        &self,
        path: &Path,
        pattern: &str,
        output: &mut W,
    ) -> Result<Metadata, ParseError> {
        let glob = glob::Pattern::new(pattern).map_err(|source| ConfigError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;

        let file = open(path)?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
        let mut aggregator = ResultAggregator::new(base_name(path));

        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            if entry.is_dir() || !glob.matches_with(entry.name(), ENTRY_MATCH) {
                continue;
            }

            let name = entry.name().to_string();
            tracing::debug!(entry = %name, "parsing zip entry");

            let mut result = self.parse(BufReader::new(entry), output)?;
            result.tag_entry(&name);
            aggregator.fold(&name, result);
        }

        tracing::debug!(entries = aggregator.entries(), "zip archive done");
        Ok(aggregator.finish())
    }

    /// Dispatch on `kind`. `pattern` is only used for zip archives.
    pub fn parse_path<W: Write>(
        &self,
        path: &Path,
        kind: SourceKind,
        pattern: &str,
        output: &mut W,
    ) -> Result<Metadata, ParseError> {
        match kind {
            SourceKind::Plain => self.parse_file(path, output),
            SourceKind::Gzip => self.parse_gzip(path, output),
            SourceKind::Zip => self.parse_zip(path, pattern, output),
        }
    }
}
