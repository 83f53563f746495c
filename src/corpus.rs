//! Parallel compression benchmark over a directory of files.
//!
//! Every (file, configuration) pair is one job. Jobs run on a scoped worker
//! pool; each encodes, frames, reads back, decodes and verifies its input,
//! timing both directions. Results are returned in job order regardless of
//! completion order.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::decoder::decode;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::metrics::{CompressionStats, CSV_HEADER};
use crate::{CodecConfig, MatchSearch};

pub const DEFAULT_WINDOW_SIZES: [u32; 4] = [1024, 4096, 8192, 16384];
pub const DEFAULT_LOOKAHEAD_SIZES: [u32; 4] = [16, 32, 64, 128];

/// Outcome of one verified job
#[derive(Clone, Debug)]
pub struct CorpusResult {
    pub file: PathBuf,
    pub config: CodecConfig,
    pub stats: CompressionStats,
}

impl CorpusResult {
    /// File name used in reports
    pub fn name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

#[derive(Clone)]
struct Job<'a> {
    id: usize,
    file: &'a Path,
    config: CodecConfig,
}

/// Regular, non-hidden files directly inside `dir`, sorted by path
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Every combination of the given window and look-ahead sizes
pub fn config_grid(
    windows: &[u32],
    lookaheads: &[u32],
    min_match: u32,
    search: MatchSearch,
) -> Vec<CodecConfig> {
    windows
        .iter()
        .flat_map(|&w| {
            lookaheads
                .iter()
                .map(move |&l| CodecConfig::new(w, l).with_min_match(min_match).with_search(search))
        })
        .collect()
}

/// Run every file against every configuration.
///
/// `threads == 0` picks one worker per CPU. The first failing job aborts
/// the run with its error.
pub fn run(files: &[PathBuf], configs: &[CodecConfig], threads: usize) -> Result<Vec<CorpusResult>> {
    for config in configs {
        config.validate()?;
    }

    let jobs: Vec<Job<'_>> = files
        .iter()
        .flat_map(|file| configs.iter().map(move |config| (file, config)))
        .enumerate()
        .map(|(id, (file, config))| Job { id, file, config: config.clone() })
        .collect();
    if jobs.is_empty() {
        return Ok(Vec::new());
    }

    let threads = match threads {
        0 => num_cpus::get().clamp(1, 32),
        n => n,
    }
    .min(jobs.len());
    log::info!("running {} jobs on {} threads", jobs.len(), threads);

    let channel_capacity = threads * 2;
    let (job_tx, job_rx): (Sender<Job<'_>>, Receiver<Job<'_>>) = bounded(channel_capacity);
    let (result_tx, result_rx) = bounded(channel_capacity);

    let result = crossbeam::scope(|scope| {
        for _ in 0..threads {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move |_| worker(job_rx, result_tx));
        }
        drop(job_rx);
        drop(result_tx);

        dispatch_and_collect(jobs, job_tx, result_rx)
    });

    result.map_err(|_| Error::Internal("Thread panicked".to_string()))?
}

fn worker(jobs: Receiver<Job<'_>>, results: Sender<(usize, Result<CorpusResult>)>) {
    for job in jobs {
        let outcome = run_job(&job);
        if results.send((job.id, outcome)).is_err() {
            break;
        }
    }
}

/// Feed jobs to the pool while draining results, so neither channel can
/// fill up and stall the other side.
fn dispatch_and_collect<'a>(
    jobs: Vec<Job<'a>>,
    job_tx: Sender<Job<'a>>,
    result_rx: Receiver<(usize, Result<CorpusResult>)>,
) -> Result<Vec<CorpusResult>> {
    let total = jobs.len();
    let mut done: BTreeMap<usize, CorpusResult> = BTreeMap::new();

    let mut store = |(id, outcome): (usize, Result<CorpusResult>)| -> Result<()> {
        done.insert(id, outcome?);
        Ok(())
    };

    for job in jobs {
        let mut sent = false;
        while !sent {
            crossbeam::channel::select! {
                send(job_tx, job.clone()) -> res => {
                    if res.is_err() {
                        return Err(Error::Internal("Workers disconnected".to_string()));
                    }
                    sent = true;
                }
                recv(result_rx) -> msg => {
                    let msg = msg.map_err(|_| Error::Internal("Result channel disconnected".to_string()))?;
                    store(msg)?;
                }
            }
        }
    }
    drop(job_tx);

    for msg in result_rx {
        store(msg)?;
    }
    drop(store);

    if done.len() != total {
        return Err(Error::Internal(format!("{} of {} jobs reported back", done.len(), total)));
    }
    Ok(done.into_values().collect())
}

fn run_job(job: &Job<'_>) -> Result<CorpusResult> {
    let input = fs::read(job.file)?;
    let encoder = Encoder::new(job.config.clone())?;

    let start = Instant::now();
    let tokens = encoder.encode(&input);
    let mut compressed = Vec::new();
    let compressed_size = write_frame(&tokens, &mut compressed)?;
    let encode_time = start.elapsed();

    let start = Instant::now();
    let decoded = decode(&read_frame(compressed.as_slice())?)?;
    let decode_time = start.elapsed();

    verify_round_trip(&input, &decoded)?;

    let stats = CompressionStats {
        original_size: input.len() as u64,
        compressed_size,
        token_count: tokens.len() as u64,
        encode_time,
        decode_time,
    };
    log::info!(
        "{} w={} l={}: ratio {:.4}",
        job.file.display(),
        job.config.window_size,
        job.config.lookahead_size,
        stats.ratio()
    );
    Ok(CorpusResult { file: job.file.to_path_buf(), config: job.config.clone(), stats })
}

/// Fail with the first offset where `decoded` departs from `input`
fn verify_round_trip(input: &[u8], decoded: &[u8]) -> Result<()> {
    let offset = input
        .iter()
        .zip(decoded)
        .position(|(a, b)| a != b)
        .or_else(|| (input.len() != decoded.len()).then(|| input.len().min(decoded.len())));
    match offset {
        Some(offset) => Err(Error::RoundTripMismatch { offset: offset as u64 }),
        None => Ok(()),
    }
}

/// Write `results` as CSV with a header row
pub fn write_csv<W: Write>(results: &[CorpusResult], mut out: W) -> Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for result in results {
        writeln!(out, "{}", result.stats.to_csv_row(&result.name(), &result.config))?;
    }
    out.flush()?;
    Ok(())
}
