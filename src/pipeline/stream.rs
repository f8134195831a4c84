// src/pipeline/stream.rs
use std::io::{BufRead, Write};
use std::time::Instant;

use crate::colors::ColorScheme;
use crate::decoder::LineDecoder;
use crate::error::{ConfigError, DecodeError, ParseError};
use crate::filter::FilterSet;
use crate::formatters::LineHandler;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::config::{ParserConfig, SkipSet, LINE_NUMBER_LABEL};
use crate::pipeline::context::{ErrorRecord, Metadata};

pub const MATCH_MARKER: &str = "[ MATCH ]";
pub const UNMATCH_MARKER: &str = "[UNMATCH]";

/// Decode → filter → select → serialize driver
pub struct Parser {
    decoder: Box<dyn LineDecoder>,
    handler: Box<dyn LineHandler>,
    filters: FilterSet,
    skip: SkipSet,
    colors: ColorScheme,
    config: ParserConfig,
}

impl Parser {
    /// Build a parser. Filters are compiled here against the decoder's labels.
    pub fn new(
        decoder: Box<dyn LineDecoder>,
        handler: Box<dyn LineHandler>,
        config: ParserConfig,
    ) -> Result<Self, ConfigError> {
        let known = decoder.labels();
        let filters = FilterSet::compile(&config.filters, known.as_deref())?;

        if let Some(known) = &known {
            for label in &config.labels {
                if !known.contains(label) {
                    tracing::warn!(label = %label, decoder = decoder.name(), "selected label is never produced");
                }
            }
        }

        Ok(Parser {
            decoder,
            handler,
            filters,
            skip: config.skip_set(),
            colors: ColorScheme::new(config.color),
            config,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn decoder(&self) -> &dyn LineDecoder {
        self.decoder.as_ref()
    }

    /// Process a whole stream
    pub fn parse<R: BufRead, W: Write>(
        &self,
        input: R,
        output: &mut W,
    ) -> Result<Metadata, ParseError> {
        self.run(input, output, None)
    }

    /// Process a stream, checking `cancel` before every line. On cancellation the
    /// metadata gathered so far comes back inside `ParseError::Cancelled`.
    pub fn parse_with_cancel<R: BufRead, W: Write>(
        &self,
        input: R,
        output: &mut W,
        cancel: &CancelToken,
    ) -> Result<Metadata, ParseError> {
        self.run(input, output, Some(cancel))
    }

    fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        output: &mut W,
        cancel: Option<&CancelToken>,
    ) -> Result<Metadata, ParseError> {
        let start_time = Instant::now();
        let mut metadata = Metadata::new();
        let mut buf = Vec::new();

        loop {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                metadata.elapsed = start_time.elapsed();
                tracing::warn!(total = metadata.total, "parse cancelled");
                return Err(ParseError::Cancelled(Box::new(metadata)));
            }

            let Some(line) = read_line(&mut input, &mut buf)? else {
                break;
            };

            metadata.total += 1;
            let line_number = metadata.total;

            if self.skip.contains(line_number) {
                metadata.skipped += 1;
                continue;
            }

            let decoded = match self.decoder.decode(&line) {
                Ok(decoded) => decoded,
                Err(DecodeError::Config(e)) => return Err(ParseError::Config(e)),
                Err(e) => {
                    tracing::debug!(line_number, error = %e, "line did not decode");
                    if self.config.echo_unmatched {
                        self.write_unmatched(output, &line)?;
                    }
                    metadata.unmatched += 1;
                    metadata.errors.push(ErrorRecord {
                        entry: String::new(),
                        line_number,
                        line,
                    });
                    continue;
                }
            };

            if !self.filters.matches(&decoded)? {
                metadata.excluded += 1;
                continue;
            }

            let mut decoded = decoded.select(&self.config.labels);

            if self.config.line_number {
                decoded.labels.insert(0, LINE_NUMBER_LABEL.to_string());
                decoded.values.insert(0, line_number.to_string());
            }

            let is_first = metadata.matched == 0;
            let record = self
                .handler
                .handle(
                    &decoded.labels,
                    &decoded.values,
                    line_number,
                    self.config.line_number,
                    is_first,
                )
                .map_err(|source| ParseError::Handler {
                    line_number,
                    source,
                })?;

            self.write_matched(output, &record)?;
            metadata.matched += 1;
        }

        metadata.elapsed = start_time.elapsed();
        tracing::debug!(
            total = metadata.total,
            matched = metadata.matched,
            unmatched = metadata.unmatched,
            excluded = metadata.excluded,
            skipped = metadata.skipped,
            "parse finished"
        );
        Ok(metadata)
    }

    fn write_matched<W: Write>(&self, output: &mut W, record: &str) -> Result<(), ParseError> {
        if self.config.markers {
            writeln!(
                output,
                "{}{}{} {}",
                self.colors.matched, MATCH_MARKER, self.colors.reset, record
            )?;
        } else {
            writeln!(output, "{}", record)?;
        }
        Ok(())
    }

    fn write_unmatched<W: Write>(&self, output: &mut W, line: &str) -> Result<(), ParseError> {
        if self.config.markers {
            writeln!(
                output,
                "{}{}{} {}",
                self.colors.unmatched, UNMATCH_MARKER, self.colors.reset, line
            )?;
        } else {
            writeln!(output, "{}", line)?;
        }
        Ok(())
    }
}

/// Next line without its `\n` or `\r\n` terminator. Invalid UTF-8 is
/// replaced rather than rejected, so such a line reaches the decoder.
fn read_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>, ParseError> {
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_strips_terminators() {
        let mut input = Cursor::new(&b"one\r\ntwo\n\nlast"[..]);
        let mut buf = Vec::new();
        let mut lines = Vec::new();
        while let Some(line) = read_line(&mut input, &mut buf).unwrap() {
            lines.push(line);
        }
        assert_eq!(lines, vec!["one", "two", "", "last"]);
    }

    #[test]
    fn test_read_line_replaces_invalid_utf8() {
        let mut input = Cursor::new(&b"\xff\xfe x\n"[..]);
        let mut buf = Vec::new();
        let line = read_line(&mut input, &mut buf).unwrap().unwrap();
        assert_eq!(line, "\u{fffd}\u{fffd} x");
    }
}
