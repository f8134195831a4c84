// tests/source_tests.rs - Plain, gzip and zip inputs
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use zip::write::SimpleFileOptions;

use logsift::{ConfigError, OutputFormat, ParseError, Parser, ParserConfig, RegexDecoder, SourceKind};

const HOST_STATUS: &str = r"^(?P<remote_host>\S+) (?P<status>\d+)$";

fn parser() -> Parser {
    let decoder = RegexDecoder::new(&[HOST_STATUS]).unwrap();
    Parser::new(
        Box::new(decoder),
        OutputFormat::Json.line_handler(),
        ParserConfig::default(),
    )
    .unwrap()
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}

#[test]
fn test_parse_file_sets_source() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "10.0.0.1 200").unwrap();
    writeln!(file, "garbage").unwrap();
    file.flush().unwrap();

    let mut output = Vec::new();
    let metadata = parser().parse_file(file.path(), &mut output).unwrap();

    let expected = file.path().file_name().unwrap().to_string_lossy();
    assert_eq!(metadata.source, expected);
    assert_eq!(metadata.total, 2);
    assert_eq!(metadata.matched, 1);
    assert_eq!(metadata.unmatched, 1);
    assert!(metadata.zip_entries.is_empty());
}

#[test]
fn test_parse_file_missing() {
    let mut output = Vec::new();
    let err = parser()
        .parse_file(Path::new("/nonexistent/access.log"), &mut output)
        .unwrap_err();
    assert!(matches!(err, ParseError::Open { .. }));
}

#[test]
fn test_parse_gzip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("access.log.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(b"a 200\nb 404\n").unwrap();
    encoder.finish().unwrap();

    let mut output = Vec::new();
    let metadata = parser().parse_gzip(&path, &mut output).unwrap();

    assert_eq!(metadata.source, "access.log.gz");
    assert_eq!(metadata.matched, 2);
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "{\"remote_host\":\"a\",\"status\":\"200\"}\n{\"remote_host\":\"b\",\"status\":\"404\"}\n"
    );
}

#[test]
fn test_parse_gzip_reads_every_member() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rotated.log.gz");
    let mut file = File::create(&path).unwrap();
    for chunk in ["a 200\n", "b 200\nc 404\n"] {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(chunk.as_bytes()).unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
    }
    drop(file);

    let mut output = Vec::new();
    let metadata = parser().parse_gzip(&path, &mut output).unwrap();

    assert_eq!(metadata.total, 3);
    assert_eq!(metadata.matched, 3);
    assert_eq!(String::from_utf8(output).unwrap().lines().count(), 3);
}

#[test]
fn test_parse_gzip_rejects_plain_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not-really.gz");
    std::fs::write(&path, "a 200\n").unwrap();

    let mut output = Vec::new();
    let err = parser().parse_gzip(&path, &mut output).unwrap_err();
    assert!(matches!(err, ParseError::Io(_)));
}

#[test]
fn test_parse_zip_aggregates_entries_in_archive_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs.zip");
    write_zip(
        &path,
        &[
            ("b.log", "b1 200\nbad line\n"),
            ("logs/", ""),
            ("a.log", "a1 200\na2 500\n"),
            ("notes.txt", "not a log\n"),
        ],
    );

    let mut output = Vec::new();
    let metadata = parser().parse_zip(&path, "*.log", &mut output).unwrap();

    assert_eq!(metadata.source, "logs.zip");
    assert_eq!(metadata.zip_entries, vec!["b.log", "a.log"]);
    assert_eq!(metadata.total, 4);
    assert_eq!(metadata.matched, 3);
    assert_eq!(metadata.unmatched, 1);
    assert!(metadata.is_consistent());

    assert_eq!(metadata.errors.len(), 1);
    assert_eq!(metadata.errors[0].entry, "b.log");
    assert_eq!(metadata.errors[0].line_number, 2);

    let output = String::from_utf8(output).unwrap();
    let hosts: Vec<&str> = output.lines().collect();
    assert!(hosts[0].contains("b1"));
    assert!(hosts[1].contains("a1"));
    assert!(hosts[2].contains("a2"));
}

#[test]
fn test_parse_zip_wildcard_stays_in_one_segment() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs.zip");
    write_zip(
        &path,
        &[
            ("top.log", "t 200\n"),
            ("nested/", ""),
            ("nested/deep.log", "d 200\n"),
        ],
    );

    let mut output = Vec::new();
    let metadata = parser().parse_zip(&path, "*.log", &mut output).unwrap();
    assert_eq!(metadata.zip_entries, vec!["top.log"]);

    let mut output = Vec::new();
    let metadata = parser().parse_zip(&path, "nested/*.log", &mut output).unwrap();
    assert_eq!(metadata.zip_entries, vec!["nested/deep.log"]);

    let mut output = Vec::new();
    let metadata = parser().parse_zip(&path, "**", &mut output).unwrap();
    assert_eq!(metadata.zip_entries, vec!["top.log", "nested/deep.log"]);
}

#[test]
fn test_parse_zip_no_matching_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs.zip");
    write_zip(&path, &[("notes.txt", "hello\n")]);

    let mut output = Vec::new();
    let metadata = parser().parse_zip(&path, "*.log", &mut output).unwrap();

    assert_eq!(metadata.total, 0);
    assert!(metadata.zip_entries.is_empty());
    assert!(output.is_empty());
}

#[test]
fn test_parse_zip_invalid_glob() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs.zip");
    write_zip(&path, &[("a.log", "a 200\n")]);

    let mut output = Vec::new();
    let err = parser().parse_zip(&path, "[", &mut output).unwrap_err();
    assert!(matches!(err, ParseError::Config(ConfigError::Glob { .. })));
}

#[test]
fn test_parse_zip_rejects_non_archive() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "a 200").unwrap();
    file.flush().unwrap();

    let mut output = Vec::new();
    let err = parser().parse_zip(file.path(), "*", &mut output).unwrap_err();
    assert!(matches!(err, ParseError::Zip(_)));
}

#[test]
fn test_parse_path_dispatches_on_kind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bundle.zip");
    write_zip(&path, &[("x.log", "x 200\n")]);

    let kind = SourceKind::detect(&path);
    assert_eq!(kind, SourceKind::Zip);

    let mut output = Vec::new();
    let metadata = parser().parse_path(&path, kind, "*", &mut output).unwrap();
    assert_eq!(metadata.zip_entries, vec!["x.log"]);
    assert_eq!(metadata.matched, 1);
}

#[test]
fn test_parse_reader() {
    let mut output = Vec::new();
    let metadata = parser()
        .parse_reader(&b"a 200\nb 201"[..], &mut output)
        .unwrap();
    assert_eq!(metadata.total, 2);
    assert_eq!(metadata.matched, 2);
    assert!(metadata.source.is_empty());
}
