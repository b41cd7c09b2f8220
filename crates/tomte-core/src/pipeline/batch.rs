//! Concurrent batch fingerprinting with results streamed in completion order.
//!
//! A dispatcher task hands each path to its own worker task once a semaphore
//! permit is free, so at most `workers` files are in flight. Workers run the
//! blocking decode/hash/EXIF work on tokio's blocking pool and push their
//! outcome into a bounded channel as soon as they finish. A worker keeps its
//! slot until the channel accepts its outcome, so a consumer that falls behind
//! by more than the buffer holds back new units. The channel closes only after
//! the dispatcher has joined every worker it started.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

use crate::config::{host_parallelism, Config};
use crate::error::PipelineError;
use crate::types::{display_name, FileOutcome, FileResult};

use super::hash::Fingerprinter;
use super::metadata::MetadataExtractor;

/// The work done for one path, run on the blocking pool.
type Unit = Arc<dyn Fn(&Path) -> FileOutcome + Send + Sync>;

/// Concurrency settings for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of files processed at once
    pub workers: usize,
    /// Completed outcomes buffered before workers (and so intake) wait on the
    /// consumer
    pub buffer_size: usize,
}

impl Default for BatchOptions {
    /// One worker per processing unit on the host.
    fn default() -> Self {
        Self {
            workers: host_parallelism(),
            buffer_size: 100,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.processing.parallel_workers,
            buffer_size: config.pipeline.buffer_size,
        }
    }
}

/// Counts reported once a batch has been joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Units handed to a worker (each produced exactly one outcome)
    pub submitted: usize,
    /// Units never started because the consumer went away
    pub not_submitted: usize,
}

/// Runs the fingerprint pipeline over many files concurrently.
pub struct BatchProcessor {
    fingerprinter: Arc<Fingerprinter>,
    options: BatchOptions,
}

impl BatchProcessor {
    /// Create a batch processor from the configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_options(
            Fingerprinter::from_config(config),
            BatchOptions::from_config(config),
        )
    }

    pub fn with_options(fingerprinter: Fingerprinter, options: BatchOptions) -> Self {
        Self {
            fingerprinter: Arc::new(fingerprinter),
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Start processing `paths` and return the stream of outcomes.
    ///
    /// Outcomes arrive in completion order, not in the order of `paths`.
    /// Every submitted path yields exactly one outcome. Must be called from
    /// within a tokio runtime.
    pub fn run(&self, paths: Vec<PathBuf>) -> BatchStream {
        let fingerprinter = self.fingerprinter.clone();
        let unit: Unit = Arc::new(move |path: &Path| process_file(&fingerprinter, path));
        spawn_batch(paths, unit, &self.options)
    }
}

fn spawn_batch(paths: Vec<PathBuf>, unit: Unit, options: &BatchOptions) -> BatchStream {
    let workers = options.workers.min(paths.len()).max(1);
    let (tx, rx) = mpsc::channel(options.buffer_size.max(1));

    tracing::debug!(
        "Starting batch of {} file(s) with {} worker(s)",
        paths.len(),
        workers
    );
    let dispatcher = tokio::spawn(dispatch(paths, unit, workers, tx));

    BatchStream {
        receiver: rx,
        dispatcher,
    }
}

/// Outcomes of a running batch, in completion order.
pub struct BatchStream {
    receiver: mpsc::Receiver<FileOutcome>,
    dispatcher: JoinHandle<BatchSummary>,
}

impl BatchStream {
    /// Wait for the next finished unit. Returns `None` once every submitted
    /// unit has completed and been delivered.
    pub async fn next(&mut self) -> Option<FileOutcome> {
        self.receiver.recv().await
    }

    /// Stop consuming and wait for the batch to wind down.
    ///
    /// No new units are started after this; units already running finish and
    /// their outcomes are discarded.
    pub async fn join(self) -> BatchSummary {
        drop(self.receiver);
        match self.dispatcher.await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Batch dispatcher failed: {e}");
                BatchSummary::default()
            }
        }
    }

    /// Drain every outcome, then join.
    pub async fn collect(mut self) -> (Vec<FileOutcome>, BatchSummary) {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next().await {
            outcomes.push(outcome);
        }
        let summary = self.join().await;
        (outcomes, summary)
    }
}

/// Hand each path to exactly one worker, bounded by the semaphore, then join.
async fn dispatch(
    paths: Vec<PathBuf>,
    unit: Unit,
    workers: usize,
    tx: mpsc::Sender<FileOutcome>,
) -> BatchSummary {
    let total = paths.len();
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut handles = Vec::with_capacity(total);

    for path in paths {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            tracing::warn!("Worker semaphore closed unexpectedly, stopping batch");
            break;
        };
        if tx.is_closed() {
            tracing::debug!("Result stream dropped, not starting further files");
            break;
        }

        let unit = unit.clone();
        let tx = tx.clone();
        handles.push(tokio::spawn(async move {
            let outcome = run_unit(unit, path).await;
            // A closed channel means the consumer stopped listening
            let _ = tx.send(outcome).await;
            drop(permit);
        }));
    }
    drop(tx);

    let submitted = handles.len();
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Worker task panicked: {e}");
        }
    }

    BatchSummary {
        submitted,
        not_submitted: total - submitted,
    }
}

/// Run one unit on the blocking pool; a panic becomes a failed outcome.
async fn run_unit(unit: Unit, path: PathBuf) -> FileOutcome {
    let unit_path = path.clone();
    match tokio::task::spawn_blocking(move || unit(&unit_path)).await {
        Ok(outcome) => outcome,
        Err(e) => FileOutcome::failed(
            &path,
            PipelineError::Worker {
                path: path.clone(),
                message: e.to_string(),
            },
        ),
    }
}

/// Fingerprint and date one file.
///
/// This is the whole unit of work; callers that want a single file without a
/// runtime can use it directly.
pub fn process_file(fingerprinter: &Fingerprinter, path: &Path) -> FileOutcome {
    let start = Instant::now();
    tracing::debug!("Processing: {:?}", path);

    let fingerprint = match fingerprinter.fingerprint(path) {
        Ok(fingerprint) => fingerprint,
        Err(e) => return FileOutcome::failed(path, e),
    };
    let hash_time = start.elapsed();
    tracing::trace!("  Fingerprint: {:?}", hash_time);

    let timestamp = MetadataExtractor::extract_date(path);
    tracing::trace!("  Date: {:?}", start.elapsed() - hash_time);

    tracing::debug!("Processed {:?} in {:?}", path, start.elapsed());
    FileOutcome::Completed(FileResult {
        path: path.to_path_buf(),
        file_name: display_name(path),
        timestamp,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use crate::types::UNKNOWN_DATE;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn processor(workers: usize) -> BatchProcessor {
        BatchProcessor::with_options(
            Fingerprinter::default(),
            BatchOptions {
                workers,
                buffer_size: 4,
            },
        )
    }

    fn completed(path: &Path) -> FileOutcome {
        FileOutcome::Completed(FileResult {
            path: path.to_path_buf(),
            file_name: display_name(path),
            timestamp: *UNKNOWN_DATE,
            fingerprint: "0".repeat(40),
        })
    }

    fn named_paths(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| PathBuf::from(format!("/photos/{i:02}.jpg")))
            .collect()
    }

    fn valid_files(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let jpeg = fixtures::jpeg_bytes(16 + i as u32, 16, i as u8);
                fixtures::write(dir, &format!("img_{i:02}.jpg"), &jpeg)
            })
            .collect()
    }

    #[test]
    fn test_batch_options_from_config() {
        let mut config = Config::default();
        config.processing.parallel_workers = 3;
        config.pipeline.buffer_size = 7;

        let options = BatchOptions::from_config(&config);
        assert_eq!(options.workers, 3);
        assert_eq!(options.buffer_size, 7);
    }

    #[test]
    fn test_batch_options_default_uses_host_parallelism() {
        assert_eq!(BatchOptions::default().workers, host_parallelism());
    }

    #[test]
    fn test_process_file_example() {
        let dir = tempfile::tempdir().unwrap();
        let a = fixtures::write(
            dir.path(),
            "a.jpg",
            &fixtures::with_exif_datetime(&fixtures::jpeg_bytes(20, 20, 1), "2020:01:01 10:00:00"),
        );
        let b = fixtures::write(dir.path(), "b.jpg", &fixtures::jpeg_bytes(20, 20, 2));
        let fingerprinter = Fingerprinter::default();

        let FileOutcome::Completed(a_result) = process_file(&fingerprinter, &a) else {
            panic!("a.jpg should succeed");
        };
        let FileOutcome::Completed(b_result) = process_file(&fingerprinter, &b) else {
            panic!("b.jpg should succeed");
        };

        assert_eq!(a_result.file_name, "a.jpg");
        assert_eq!(a_result.timestamp.to_string(), "2020-01-01 10:00:00");
        assert_eq!(a_result.fingerprint.len(), 40);
        assert_eq!(b_result.timestamp, *UNKNOWN_DATE);
        assert_eq!(b_result.fingerprint.len(), 40);

        let FileOutcome::Completed(again) = process_file(&fingerprinter, &a) else {
            panic!("a.jpg should succeed twice");
        };
        assert_eq!(again.fingerprint, a_result.fingerprint);
    }

    #[test]
    fn test_process_file_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "broken.jpg", b"\xFF\xD8\xFF garbage");

        match process_file(&Fingerprinter::default(), &path) {
            FileOutcome::Failed(failure) => {
                assert_eq!(failure.file_name, "broken.jpg");
                assert!(matches!(failure.error, PipelineError::Decode { .. }));
            }
            FileOutcome::Completed(_) => panic!("corrupt file must not produce a fingerprint"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_path_reported_once_for_any_pool_size() {
        let dir = tempfile::tempdir().unwrap();
        let paths = valid_files(dir.path(), 12);
        let expected: HashSet<PathBuf> = paths.iter().cloned().collect();

        for workers in [1, 2, 5, 12] {
            let (outcomes, summary) = processor(workers).run(paths.clone()).collect().await;

            assert_eq!(outcomes.len(), paths.len(), "workers = {workers}");
            let seen: HashSet<PathBuf> = outcomes.iter().map(|o| o.path().to_path_buf()).collect();
            assert_eq!(seen, expected, "workers = {workers}");
            assert!(outcomes.iter().all(FileOutcome::is_completed));
            assert_eq!(
                summary,
                BatchSummary {
                    submitted: 12,
                    not_submitted: 0
                }
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_results_match_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = valid_files(dir.path(), 6);

        let fingerprints = |outcomes: Vec<FileOutcome>| -> HashMap<PathBuf, String> {
            outcomes
                .into_iter()
                .map(|o| match o {
                    FileOutcome::Completed(r) => (r.path, r.fingerprint),
                    FileOutcome::Failed(f) => panic!("unexpected failure: {}", f.error),
                })
                .collect()
        };

        let (first, _) = processor(3).run(paths.clone()).collect().await;
        let (second, _) = processor(1).run(paths).collect().await;
        assert_eq!(fingerprints(first), fingerprints(second));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_corrupt_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = valid_files(dir.path(), 5);
        let corrupt = fixtures::write(dir.path(), "corrupt.jpg", b"not a jpeg at all");
        let empty = fixtures::write(dir.path(), "empty.jpg", b"");
        paths.insert(2, corrupt.clone());
        paths.push(empty.clone());

        let (outcomes, summary) = processor(3).run(paths).collect().await;

        assert_eq!(outcomes.len(), 7);
        assert_eq!(summary.submitted, 7);
        let failed: HashSet<PathBuf> = outcomes
            .iter()
            .filter(|o| !o.is_completed())
            .map(|o| o.path().to_path_buf())
            .collect();
        assert_eq!(failed, HashSet::from([corrupt, empty]));
        assert_eq!(outcomes.iter().filter(|o| o.is_completed()).count(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_missing_file_reported_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.jpg");

        let (outcomes, _) = processor(2).run(vec![missing.clone()]).collect().await;
        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            FileOutcome::Failed(failure) => {
                assert_eq!(failure.path, missing);
                assert!(matches!(failure.error, PipelineError::FileNotFound(_)));
            }
            FileOutcome::Completed(_) => panic!("missing file must fail"),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_ends_immediately() {
        let (outcomes, summary) = processor(4).run(Vec::new()).collect().await;
        assert!(outcomes.is_empty());
        assert_eq!(summary, BatchSummary::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_pool_larger_than_batch() {
        let dir = tempfile::tempdir().unwrap();
        let paths = valid_files(dir.path(), 2);

        let (outcomes, _) = processor(64).run(paths).collect().await;
        assert_eq!(outcomes.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropping_stream_stops_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let paths = valid_files(dir.path(), 20);

        let mut stream = BatchProcessor::with_options(
            Fingerprinter::default(),
            BatchOptions {
                workers: 1,
                buffer_size: 1,
            },
        )
        .run(paths);
        assert!(stream.next().await.is_some());

        let summary = stream.join().await;
        assert_eq!(summary.submitted + summary.not_submitted, 20);
        assert!(summary.submitted >= 1);
        assert!(summary.not_submitted > 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_unit_becomes_worker_failure() {
        let paths = named_paths(5);
        let poisoned = paths[3].clone();
        let target = poisoned.clone();
        let unit: Unit = Arc::new(move |path: &Path| {
            if path == target.as_path() {
                panic!("decoder blew up");
            }
            completed(path)
        });
        let options = BatchOptions {
            workers: 2,
            buffer_size: 2,
        };

        let (outcomes, summary) = spawn_batch(paths.clone(), unit, &options).collect().await;

        assert_eq!(outcomes.len(), 5);
        assert_eq!(summary.submitted, 5);
        let seen: HashSet<PathBuf> = outcomes.iter().map(|o| o.path().to_path_buf()).collect();
        assert_eq!(seen, paths.iter().cloned().collect::<HashSet<_>>());

        let failures: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                FileOutcome::Failed(failure) => Some(failure),
                FileOutcome::Completed(_) => None,
            })
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, poisoned);
        assert!(matches!(
            &failures[0].error,
            PipelineError::Worker { path, .. } if *path == poisoned
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_consumer_holds_back_new_units() {
        let started = Arc::new(AtomicUsize::new(0));
        let counter = started.clone();
        let unit: Unit = Arc::new(move |path: &Path| {
            counter.fetch_add(1, Ordering::SeqCst);
            completed(path)
        });
        let options = BatchOptions {
            workers: 2,
            buffer_size: 1,
        };

        let stream = spawn_batch(named_paths(10), unit, &options);
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Two workers parked on a full one-slot channel, plus the buffered one
        assert!(started.load(Ordering::SeqCst) <= 3);

        let (outcomes, summary) = stream.collect().await;
        assert_eq!(outcomes.len(), 10);
        assert_eq!(started.load(Ordering::SeqCst), 10);
        assert_eq!(summary.not_submitted, 0);
    }
}
