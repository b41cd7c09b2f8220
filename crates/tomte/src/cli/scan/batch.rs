//! Batch scanning: streams outcomes to the output as workers finish.

use std::io::Write;
use std::path::PathBuf;

use tomte_core::{BatchProcessor, FileOutcome, OutputWriter};

/// Per-run counts for the summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanTally {
    pub succeeded: u64,
    pub failed: u64,
    pub undated: u64,
}

/// Run the batch and write each result the moment it completes.
///
/// Failed files are logged at error level with their cause; they are counted
/// but never written as result lines.
pub async fn stream_batch<W: Write>(
    processor: &BatchProcessor,
    files: Vec<PathBuf>,
    writer: &mut OutputWriter<W>,
    show_progress: bool,
) -> anyhow::Result<ScanTally> {
    let total = files.len() as u64;
    let progress = if show_progress {
        create_progress_bar(total)
    } else {
        indicatif::ProgressBar::hidden()
    };

    let mut tally = ScanTally::default();
    let start_time = std::time::Instant::now();
    let mut stream = processor.run(files);

    while let Some(outcome) = stream.next().await {
        match outcome {
            FileOutcome::Completed(result) => {
                tally.succeeded += 1;
                if !result.has_known_date() {
                    tally.undated += 1;
                }
                progress.suspend(|| writer.write(&result))?;
            }
            FileOutcome::Failed(failure) => {
                tally.failed += 1;
                progress.suspend(|| tracing::error!("Failed: {:?} - {}", failure.path, failure.error));
            }
        }

        // Update progress bar with rate
        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let processed = tally.succeeded + tally.failed;
            progress.set_message(format!("{:.1} img/sec", processed as f64 / elapsed));
        }
    }

    let summary = stream.join().await;
    progress.finish_and_clear();

    let elapsed = start_time.elapsed();
    tracing::info!(
        "Processed {} file(s) in {:.1}s: {} succeeded ({} without a capture date), {} failed",
        summary.submitted,
        elapsed.as_secs_f64(),
        tally.succeeded,
        tally.undated,
        tally.failed
    );
    if summary.not_submitted > 0 {
        tracing::warn!("{} file(s) were not processed", summary.not_submitted);
    }

    Ok(tally)
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}
