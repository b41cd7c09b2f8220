//! The `tomte scan` command for fingerprinting images.

mod batch;
#[cfg(test)]
mod fixtures;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tomte_core::{
    process_file, BatchProcessor, Config, FileDiscovery, FileOutcome, Fingerprinter,
    OutputFormat as CoreOutputFormat, OutputWriter,
};

use batch::stream_batch;

/// Arguments for the `scan` command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Image file or directory to scan
    #[arg(required = true, value_name = "SRC")]
    pub input: PathBuf,

    /// Descend into subdirectories
    #[arg(long, overrides_with = "no_recurse")]
    pub recurse: bool,

    /// Only scan the top level of SRC (default)
    #[arg(long, overrides_with = "recurse")]
    pub no_recurse: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `output.format` from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of parallel workers (defaults to the number of CPUs)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,
}

impl ScanArgs {
    /// Resolve `--recurse/--no-recurse` against the configured default.
    fn recursive(&self, default: bool) -> bool {
        if self.recurse {
            true
        } else if self.no_recurse {
            false
        } else {
            default
        }
    }
}

/// Execute the scan command.
pub async fn execute(args: ScanArgs, mut config: Config) -> anyhow::Result<()> {
    let input = expand_path(&args.input);
    if !input.exists() {
        anyhow::bail!(
            "Invalid value for SRC: {:?} does not exist\n\n  Hint: Check the path and try again.",
            args.input
        );
    }

    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    config.validate()?;

    let format = match args.format {
        Some(format) => CoreOutputFormat::from(format),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Text),
    };
    let mut writer = OutputWriter::new(open_output(args.output.as_deref())?, format);

    if input.is_file() {
        scan_single(&config, &input, &mut writer).await?;
    } else {
        let recursive = args.recursive(config.processing.recursive);
        let files = FileDiscovery::new(config.processing.clone()).discover(&input, recursive);
        tracing::info!("Found {} image(s) to process", files.len());
        writer.write_count(files.len())?;

        let processor = BatchProcessor::new(&config);
        let tally = stream_batch(&processor, files, &mut writer, args.progress).await?;
        writer.flush()?;
        if tally.failed > 0 {
            anyhow::bail!("{} file(s) could not be fingerprinted", tally.failed);
        }
    }

    if let Some(output_path) = &args.output {
        tracing::info!("Output written to {:?}", output_path);
    }
    Ok(())
}

// ── Single-file processing ─────────────────────────────────────────────────

/// Fingerprint one file given directly on the command line.
async fn scan_single<W: Write>(
    config: &Config,
    path: &Path,
    writer: &mut OutputWriter<W>,
) -> anyhow::Result<()> {
    let fingerprinter = Fingerprinter::from_config(config);
    let path_owned = path.to_path_buf();
    let outcome =
        tokio::task::spawn_blocking(move || process_file(&fingerprinter, &path_owned)).await?;

    match outcome {
        FileOutcome::Completed(result) => {
            writer.write(&result)?;
            writer.flush()?;
            Ok(())
        }
        FileOutcome::Failed(failure) => Err(failure.error.into()),
    }
}

/// Result sink: a buffered file, or stdout.
fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(expand_path(path))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

/// Expand a leading `~` in a user-supplied path.
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
