//! CLI binary for hansard-parser.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ParserConfig`, then prints or stores each parsed transcript.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use futures::StreamExt;
use hansard_parser::pipeline::{input::is_url, pdftohtml::normalise_output};
use hansard_parser::{
    check_converter, parse_markup, parse_stream, Chunk, ImportOutcome, ParseProgressCallback,
    ParsedTranscript, ParserConfig, ProgressCallback, SqliteStore, DEFAULT_PDFTOHTML_VERSION,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar for the whole batch and a log line per finished document.
/// Documents finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Parsing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ParseProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, input: &str) {
        self.bar.set_message(input.to_string());
    }

    fn on_document_complete(&self, input: &str, chunks: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            input,
            dim(&format!("{chunks} chunks"))
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, input: &str, error: &str) {
        self.bar
            .println(format!("  {} {}  {}", red("✗"), input, red(error)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_documents.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} documents parsed",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents parsed  ({} failed)",
                red("✘"),
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse a transcript and print a readable listing
  hansard hansard-2016-03-01.pdf

  # Structured JSON
  hansard --json https://example.org/hansard/Hansard_01.03.16.pdf > sitting.json

  # Parse markup that was converted elsewhere
  hansard --markup sitting.html

  # Store a sitting in SQLite
  hansard --db hansard.db --date 2016-03-01 --name "Hansard 1 March 2016" sitting.pdf

  # Convert on another machine
  hansard --remote-host pdf-worker sitting.pdf

  # Check the local converter only
  hansard --check-converter

ENVIRONMENT VARIABLES:
  HANSARD_PDFTOHTML          Converter binary (default: pdftohtml)
  HANSARD_PDFTOHTML_VERSION  Required converter version string
  HANSARD_PDFTOHTML_HOST     Convert on this host via the remote script
  RUST_LOG                   Override log filter
"#;

/// Parse Kenyan Hansard transcripts into structured sittings.
#[derive(Parser, Debug)]
#[command(
    name = "hansard",
    version,
    about = "Parse Kenyan Hansard transcripts into structured sittings",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Transcript PDFs (paths or HTTP/HTTPS URLs), or markup files with --markup.
    #[arg(required_unless_present = "check_converter")]
    inputs: Vec<String>,

    /// Inputs are already-converted pdftohtml markup.
    #[arg(long)]
    markup: bool,

    /// Print each transcript as JSON.
    #[arg(long, env = "HANSARD_JSON")]
    json: bool,

    /// Store parsed sittings in this SQLite database instead of printing them.
    #[arg(long, env = "HANSARD_DB", requires = "date")]
    db: Option<PathBuf>,

    /// Source name for --db (default: the input's file stem).
    #[arg(long)]
    name: Option<String>,

    /// Sitting date for --db, as YYYY-MM-DD.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Run only the converter version check.
    #[arg(long)]
    check_converter: bool,

    /// pdftohtml binary.
    #[arg(long, env = "HANSARD_PDFTOHTML", default_value = "pdftohtml")]
    pdftohtml: String,

    /// Version string the converter must report.
    #[arg(long, env = "HANSARD_PDFTOHTML_VERSION", default_value = DEFAULT_PDFTOHTML_VERSION)]
    pdftohtml_version: String,

    /// Convert on this host instead of locally.
    #[arg(long, env = "HANSARD_PDFTOHTML_HOST")]
    remote_host: Option<String>,

    /// Script run as `<script> <host> <pdf>` for remote conversion.
    #[arg(long, env = "HANSARD_PDFTOHTML_SCRIPT", default_value = "scripts/pdftohtml-remote.sh")]
    remote_script: PathBuf,

    /// Documents parsed concurrently.
    #[arg(short, long, env = "HANSARD_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "HANSARD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "HANSARD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HANSARD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HANSARD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.markup && !cli.check_converter;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ParseProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check_converter {
        let banner = check_converter(&config.converter)
            .await
            .context("Converter check failed")?;
        println!("{} {}", green("✔"), banner);
        return Ok(());
    }

    if cli.name.is_some() && cli.inputs.len() > 1 {
        bail!("--name can only be used with a single input");
    }

    let mut sink = Sink::new(&cli)?;
    let total = cli.inputs.len();
    let mut failed = 0usize;

    // ── Parse ────────────────────────────────────────────────────────────
    if cli.markup {
        for input in &cli.inputs {
            let result = read_markup(input).and_then(|markup| {
                parse_markup(&markup).with_context(|| format!("Failed to parse {input}"))
            });
            match result {
                Ok(transcript) => sink.accept(input, &transcript)?,
                Err(e) => {
                    failed += 1;
                    eprintln!("{} {input}: {e:#}", red("✗"));
                }
            }
        }
    } else {
        let mut results = parse_stream(cli.inputs.clone(), &config)
            .await
            .context("Cannot start parsing")?;
        while let Some(doc) = results.next().await {
            match doc.result {
                Ok(transcript) => sink.accept(&doc.input, &transcript)?,
                Err(e) => {
                    failed += 1;
                    if !show_progress {
                        eprintln!("{} {}: {e}", red("✗"), doc.input);
                    }
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} documents failed");
    }
    Ok(())
}

/// Map CLI args to `ParserConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ParserConfig> {
    let mut builder = ParserConfig::builder()
        .converter_binary(&cli.pdftohtml)
        .expected_version(&cli.pdftohtml_version)
        .remote_script(&cli.remote_script)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref host) = cli.remote_host {
        builder = builder.remote_host(host);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn read_markup(path: &str) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {path}"))?;
    Ok(normalise_output(&bytes))
}

/// Where parsed transcripts go: stdout, or a store.
enum Sink {
    Print { json: bool, quiet: bool },
    Store {
        store: SqliteStore,
        name: Option<String>,
        date: NaiveDate,
        quiet: bool,
    },
}

impl Sink {
    fn new(cli: &Cli) -> Result<Self> {
        let Some(ref path) = cli.db else {
            return Ok(Sink::Print {
                json: cli.json,
                quiet: cli.quiet,
            });
        };
        let date = cli.date.context("--date is required with --db")?;
        let store = SqliteStore::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(Sink::Store {
            store,
            name: cli.name.clone(),
            date,
            quiet: cli.quiet,
        })
    }

    fn accept(&mut self, input: &str, transcript: &ParsedTranscript) -> Result<()> {
        match self {
            Sink::Print { json: true, .. } => {
                let json = serde_json::to_string_pretty(transcript)
                    .context("Failed to serialise transcript")?;
                println!("{json}");
            }
            Sink::Print { json: false, quiet } => print_listing(input, transcript, *quiet),
            Sink::Store {
                store,
                name,
                date,
                quiet,
            } => {
                let name = name.clone().unwrap_or_else(|| source_name(input));
                let url = is_url(input).then_some(input);
                let source = store
                    .add_source(&name, *date, url)
                    .context("Failed to record source")?;
                let outcome = store
                    .import(transcript, &source)
                    .with_context(|| format!("Failed to store {input}"))?;
                if !*quiet {
                    match outcome {
                        ImportOutcome::Created {
                            sitting_id,
                            entries,
                        } => eprintln!(
                            "{} {input} → sitting {sitting_id} ({entries} entries)",
                            green("✔")
                        ),
                        ImportOutcome::Duplicate => eprintln!(
                            "{} {input}: joint sitting already stored, skipped",
                            dim("•")
                        ),
                    }
                }
            }
        }
        Ok(())
    }
}

fn print_listing(input: &str, transcript: &ParsedTranscript, quiet: bool) {
    let meta = &transcript.meta;
    let time = |t: Option<chrono::NaiveTime>| {
        t.map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "?".into())
    };
    if !quiet {
        println!(
            "{}  {}  {} to {}",
            bold(input),
            meta.venue,
            time(meta.start_time),
            time(meta.end_time)
        );
    }
    for chunk in &transcript.chunks {
        let page = dim(&format!("p{:<3}", chunk.page_number()));
        match chunk {
            Chunk::Speech {
                speaker_name,
                speaker_title,
                text,
                ..
            } if speaker_title.is_empty() => println!("{page} {}: {text}", bold(speaker_name)),
            Chunk::Speech {
                speaker_name,
                speaker_title,
                text,
                ..
            } => println!("{page} {} ({speaker_title}): {text}", bold(speaker_name)),
            Chunk::Heading { text, .. } => println!("{page} {}", bold(text)),
            Chunk::Scene { text, .. } => println!("{page} {}", dim(text)),
            Chunk::Other { text, .. } => println!("{page} {text}"),
        }
    }
}

/// File stem of a path or the last segment of a URL.
fn source_name(input: &str) -> String {
    let trimmed = input.trim_end_matches('/');
    Path::new(trimmed)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_string())
}
