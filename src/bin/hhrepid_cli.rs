use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

use hhrepid_rs::harvest::{
    hit_identifiers, write_download_list_file, UrlTemplate, DEFAULT_DOWNLOAD_LIST,
};
use hhrepid_rs::{extract_repeats, Config, DEFAULT_THRESHOLD};

#[derive(Debug, Parser)]
#[command(name = "hhrepid-rs", version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
struct Cli {
    /// Logging verbosity level
    #[arg(short = 'L', long, default_value = "info", global = true)]
    level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Slice significant repeats out of their sequence records.
    Extract(ExtractCmd),
    /// Turn a hit list into a list of download URLs.
    Hits(HitsCmd),
}

#[derive(Debug, Args)]
struct ExtractCmd {
    /// Directory with HHrepID reports
    #[arg(short = 'r', long, value_name = "DIR")]
    reports: PathBuf,

    /// Directory with one alignment record per sequence id
    #[arg(short = 's', long, value_name = "DIR")]
    records: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Keep repeats with a p-value at or below this
    #[arg(short = 'p', long, default_value_t = DEFAULT_THRESHOLD)]
    pval: f64,

    /// File-name suffix of report files
    #[arg(long, default_value = "hhrepid")]
    suffix: String,

    /// File extension of record files
    #[arg(long, default_value = "a3m")]
    extension: String,

    /// Worker threads (0 = one per core)
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,
}

#[derive(Debug, Args)]
struct HitsCmd {
    /// Pairwise-alignment hit list
    input: PathBuf,

    /// Where to write the URL list
    #[arg(short = 'o', long, default_value = DEFAULT_DOWNLOAD_LIST)]
    output: PathBuf,

    #[arg(long, default_value = "http://www.uniprot.org/uniprot/")]
    base_url: String,

    #[arg(long, default_value = ".fasta")]
    url_suffix: String,
}

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn run_extract(cmd: ExtractCmd) -> Result<()> {
    if cmd.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cmd.threads)
            .build_global()
            .context("configure worker threads")?;
    }

    let config = Config {
        reports_dir: cmd.reports,
        records_dir: cmd.records,
        output_path: cmd.output,
        threshold: cmd.pval,
        report_suffix: cmd.suffix,
        record_extension: cmd.extension,
    };

    let sp = spinner("green", "Extracting repeats...");
    let results = extract_repeats(&config.report_source(), &config.record_source(), config.threshold)
        .with_context(|| format!("scan reports in {}", config.reports_dir.display()))?;
    sp.finish_with_message(format!(
        "Extracted {} repeat(s), {} report(s) without significant repeats, {} failed.",
        results.subsequences.len(),
        results.skipped.len(),
        results.failures.len()
    ));

    match &config.output_path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            results.write_fasta(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            results.write_fasta(&mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn run_hits(cmd: HitsCmd) -> Result<()> {
    let text = std::fs::read_to_string(&cmd.input)
        .with_context(|| format!("read {}", cmd.input.display()))?;
    let ids = hit_identifiers(&text).with_context(|| format!("parse {}", cmd.input.display()))?;

    let template = UrlTemplate {
        base_url: cmd.base_url,
        suffix: cmd.url_suffix,
    };
    write_download_list_file(&cmd.output, &ids, &template)
        .with_context(|| format!("write {}", cmd.output.display()))?;
    log::info!("Wrote {} URL(s) to {}", ids.len(), cmd.output.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(cli.level).init();

    match cli.command {
        Command::Extract(cmd) => run_extract(cmd),
        Command::Hits(cmd) => run_hits(cmd),
    }
}
