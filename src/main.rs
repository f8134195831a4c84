use anyhow::{bail, Context};
use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use logsift::colors::should_use_colors;
use logsift::patterns;
use logsift::report;
use logsift::{
    CancelToken, ConfigFile, LineDecoder, LtsvDecoder, Metadata, MetadataHandler, OutputFormat,
    ParseError, Parser, ParserConfig, RegexDecoder, SourceKind,
};

const EXIT_CANCELLED: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum InputType {
    Apache,
    S3,
    Clb,
    Alb,
    Nlb,
    Ltsv,
    Regex,
}

#[derive(ClapParser)]
#[command(name = "logsift")]
#[command(about = "Decode, filter and reshape access logs")]
#[command(version)]
struct Args {
    /// Input files (default: stdin)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Log format of the input
    #[arg(short = 't', long = "type", value_enum, default_value = "apache")]
    input_type: InputType,

    /// Regex pattern with named capture groups (with --type regex)
    #[arg(short = 'p', long = "pattern", action = ArgAction::Append)]
    patterns: Vec<String>,

    /// YAML config file with patterns, labels, filters and skip lines
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long = "format", value_enum, default_value = "json")]
    format: OutputFormat,

    /// Comma-separated labels to keep
    #[arg(short = 'l', long = "labels", value_delimiter = ',')]
    labels: Vec<String>,

    /// Filter expression '<label> <operator> <value>' (repeatable)
    #[arg(short = 'f', long = "filter", action = ArgAction::Append)]
    filters: Vec<String>,

    /// Comma-separated line numbers to skip
    #[arg(short = 's', long = "skip", value_delimiter = ',')]
    skip: Vec<usize>,

    /// Prepend the line number to each record
    #[arg(short = 'n', long = "line-number")]
    line_number: bool,

    /// Glob for selecting zip entries; `*` stays within one directory, `**` spans any depth
    #[arg(short = 'g', long = "glob", default_value = "**")]
    glob: String,

    /// Treat inputs as gzip regardless of extension
    #[arg(long, conflicts_with = "zip")]
    gzip: bool,

    /// Treat inputs as zip archives regardless of extension
    #[arg(long)]
    zip: bool,

    /// Print run metadata to stderr
    #[arg(short = 'm', long = "metadata")]
    metadata: bool,

    /// Print a human-readable report to stderr
    #[arg(long)]
    report: bool,

    /// Prefix output lines with match markers
    #[arg(long)]
    markers: bool,

    /// Echo lines that did not decode
    #[arg(long)]
    unmatch: bool,

    /// Stop reading stdin after this long (e.g. "30s")
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Disable colored markers
    #[arg(long)]
    no_color: bool,

    /// Debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn validate(&self) -> Result<(), String> {
        match (self.input_type, self.patterns.is_empty(), self.config.is_some()) {
            (InputType::Regex, true, false) => {
                Err("--type regex requires --pattern or --config".to_string())
            }
            (t, false, _) if t != InputType::Regex => {
                Err("--pattern can only be used with --type regex".to_string())
            }
            _ => Ok(()),
        }
    }

    fn source_kind(&self, path: &Path) -> SourceKind {
        if self.gzip {
            SourceKind::Gzip
        } else if self.zip {
            SourceKind::Zip
        } else {
            SourceKind::detect(path)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_decoder(args: &Args, file_patterns: &[String]) -> anyhow::Result<Box<dyn LineDecoder>> {
    let decoder: Box<dyn LineDecoder> = match args.input_type {
        InputType::Ltsv => Box::new(LtsvDecoder::new()),
        InputType::Regex => {
            let mut all = file_patterns.to_vec();
            all.extend(args.patterns.iter().cloned());
            Box::new(RegexDecoder::new(&all)?)
        }
        preset => {
            let name = match preset {
                InputType::Apache => "apache",
                InputType::S3 => "s3",
                InputType::Clb => "clb",
                InputType::Alb => "alb",
                _ => "nlb",
            };
            let patterns = patterns::preset(name)
                .with_context(|| format!("unknown preset '{}'", name))?;
            Box::new(RegexDecoder::new(patterns)?)
        }
    };
    Ok(decoder)
}

fn build_config(args: &Args, mut config: ParserConfig) -> ParserConfig {
    if !args.labels.is_empty() {
        config.labels = args.labels.clone();
    }
    config.filters.extend(args.filters.iter().cloned());
    config.skip_lines.extend(args.skip.iter().copied());
    config.line_number |= args.line_number;
    config.markers |= args.markers;
    config.echo_unmatched |= args.unmatch;
    config.color = !args.no_color && should_use_colors();
    config
}

fn report_metadata(args: &Args, metadata: &Metadata) -> anyhow::Result<()> {
    if args.metadata {
        let text = args.format.metadata_handler().handle(metadata)?;
        eprintln!("{}", text);
    }
    if args.report {
        eprint!("{}", report::render(metadata, report::terminal_width()));
    }
    Ok(())
}

fn run(args: Args) -> anyhow::Result<i32> {
    let file_config = match &args.config {
        Some(path) => ConfigFile::from_yaml_file(path)?,
        None => ConfigFile::default(),
    };
    if args.input_type != InputType::Regex && !file_config.patterns.is_empty() {
        bail!("config file patterns can only be used with --type regex");
    }

    let decoder = build_decoder(&args, &file_config.patterns)?;
    let config = build_config(&args, file_config.parser);
    let parser = Parser::new(decoder, args.format.line_handler(), config)?;

    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    if args.files.is_empty() {
        let cancel = CancelToken::new();
        let handler_token = cancel.clone();
        ctrlc::set_handler(move || handler_token.cancel())
            .context("failed to install Ctrl-C handler")?;

        if let Some(timeout) = args.timeout {
            let timer_token = cancel.clone();
            std::thread::spawn(move || {
                std::thread::sleep(timeout);
                timer_token.cancel();
            });
        }

        let result = parser.parse_stream(io::stdin().lock(), &mut output, &cancel);
        output.flush()?;
        return match result {
            Ok(metadata) => {
                report_metadata(&args, &metadata)?;
                Ok(0)
            }
            Err(ParseError::Cancelled(metadata)) => {
                eprintln!("Error: parse cancelled");
                report_metadata(&args, &metadata)?;
                Ok(EXIT_CANCELLED)
            }
            Err(e) => Err(e.into()),
        };
    }

    for path in &args.files {
        let kind = args.source_kind(path);
        let metadata = parser
            .parse_path(path, kind, &args.glob, &mut output)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        output.flush()?;
        report_metadata(&args, &metadata)?;
    }

    Ok(0)
}
