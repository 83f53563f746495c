use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lz77kit::corpus::{self, DEFAULT_LOOKAHEAD_SIZES, DEFAULT_WINDOW_SIZES};
use lz77kit::trace::{trace_decoding, trace_encoding};
use lz77kit::{read_archive, write_archive, CodecConfig, MatchSearch};

#[derive(Parser, Debug)]
#[command(name = "lz77")]
#[command(about = "Sliding-window LZ77 compressor with step-by-step tracing")]
#[command(version)]
struct Cli {
    /// Log progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file into an archive
    Compress {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output archive (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,

        /// Match search strategy
        #[arg(long, value_enum, default_value = "hash-chain")]
        search: SearchArg,
    },
    /// Restore the original file from an archive
    Decompress {
        /// Input archive (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print every encoding and decoding step for a short input
    Trace {
        /// Text to trace
        #[arg(long, conflicts_with = "input", required_unless_present = "input")]
        text: Option<String>,

        /// File to trace
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        codec: CodecArgs,
    },
    /// Measure every file in a directory across a grid of window sizes
    Bench {
        /// Directory of corpus files
        #[arg(short, long)]
        dir: PathBuf,

        /// Window sizes, comma separated (default: 1024,4096,8192,16384)
        #[arg(long, value_delimiter = ',')]
        windows: Vec<u32>,

        /// Look-ahead sizes, comma separated (default: 16,32,64,128)
        #[arg(long, value_delimiter = ',')]
        lookaheads: Vec<u32>,

        /// Shortest run emitted as a match
        #[arg(long, default_value = "3")]
        min_match: u32,

        /// Match search strategy
        #[arg(long, value_enum, default_value = "hash-chain")]
        search: SearchArg,

        /// Number of threads (0 = auto)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,

        /// Write results as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// Sliding window size in bytes
    #[arg(short, long, default_value = "4096")]
    window: u32,

    /// Look-ahead buffer size in bytes
    #[arg(short, long, default_value = "40")]
    lookahead: u32,

    /// Shortest run emitted as a match
    #[arg(long, default_value = "3")]
    min_match: u32,
}

impl CodecArgs {
    fn config(&self) -> CodecConfig {
        CodecConfig::new(self.window, self.lookahead).with_min_match(self.min_match)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SearchArg {
    Exhaustive,
    HashChain,
}

impl From<SearchArg> for MatchSearch {
    fn from(arg: SearchArg) -> Self {
        match arg {
            SearchArg::Exhaustive => MatchSearch::Exhaustive,
            SearchArg::HashChain => MatchSearch::HashChain,
        }
    }
}

const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Compress { input, output, codec, search } => {
            let config = codec.config().with_search(search.into());
            compress(&input, &output, &config, cli.verbose)
        }
        Command::Decompress { input, output } => decompress(&input, &output, cli.verbose),
        Command::Trace { text, input, codec } => {
            let data = match (text, input) {
                (Some(text), _) => text.into_bytes(),
                (None, Some(path)) => fs::read(path)?,
                (None, None) => return Err("either --text or --input is required".into()),
            };
            trace(&data, &codec.config())
        }
        Command::Bench { dir, windows, lookaheads, min_match, search, threads, csv } => {
            let grid = Grid {
                windows: &windows,
                lookaheads: &lookaheads,
                min_match,
                search: search.into(),
            };
            bench(&dir, &grid, threads, csv.as_deref())
        }
    }
}

fn is_stdio(path: &Path) -> bool {
    path.to_str() == Some("-")
}

fn open_input(path: &Path) -> io::Result<Box<dyn Read>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

fn open_output(path: &Path) -> io::Result<Box<dyn Write>> {
    if is_stdio(path) {
        Ok(Box::new(BufWriter::new(io::stdout().lock())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

fn compress(
    input: &Path,
    output: &Path,
    config: &CodecConfig,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut data = Vec::new();
    open_input(input)?.read_to_end(&mut data)?;

    let start = Instant::now();
    let mut sink = open_output(output)?;
    let stats = write_archive(&data, config, &mut sink)?;
    sink.flush()?;
    let elapsed = start.elapsed();

    log::info!("compressed {} to {}", input.display(), output.display());
    if verbose {
        let ratio = stats.original_size as f64 / stats.compressed_size as f64;
        eprintln!("Compression complete:");
        eprintln!("  Input bytes:      {}", stats.original_size);
        eprintln!("  Output bytes:     {}", stats.compressed_size);
        eprintln!("  Tokens:           {}", stats.token_count);
        eprintln!("  Window/lookahead: {}/{}", stats.window_size, stats.lookahead_size);
        eprintln!("  Ratio:            {:.4}", ratio);
        eprintln!("  Time:             {:.2?}", elapsed);
    }
    Ok(())
}

fn decompress(input: &Path, output: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut sink = open_output(output)?;
    let stats = read_archive(open_input(input)?, &mut sink)?;
    sink.flush()?;
    let elapsed = start.elapsed();

    log::info!("decompressed {} to {}", input.display(), output.display());
    if verbose {
        eprintln!("Decompression complete:");
        eprintln!("  Input bytes:      {}", stats.compressed_size);
        eprintln!("  Output bytes:     {}", stats.original_size);
        eprintln!("  Tokens:           {}", stats.token_count);
        eprintln!("  Time:             {:.2?}", elapsed);
    }
    Ok(())
}

fn trace(data: &[u8], config: &CodecConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = BufWriter::new(io::stdout().lock());
    let tokens = trace_encoding(data, config, &mut out)?;
    let decoded = trace_decoding(&tokens, &mut out)?;

    writeln!(out)?;
    if decoded == data {
        writeln!(out, "Verification: OK ({} bytes, {} tokens)", data.len(), tokens.len())?;
        out.flush()?;
        Ok(())
    } else {
        out.flush()?;
        Err("decoded output differs from input".into())
    }
}

/// Benchmark parameter grid as given on the command line
struct Grid<'a> {
    windows: &'a [u32],
    lookaheads: &'a [u32],
    min_match: u32,
    search: MatchSearch,
}

fn bench(
    dir: &Path,
    grid: &Grid<'_>,
    threads: usize,
    csv: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let windows = if grid.windows.is_empty() { &DEFAULT_WINDOW_SIZES[..] } else { grid.windows };
    let lookaheads =
        if grid.lookaheads.is_empty() { &DEFAULT_LOOKAHEAD_SIZES[..] } else { grid.lookaheads };

    let files = corpus::list_files(dir)?;
    if files.is_empty() {
        return Err(format!("no files found in {}", dir.display()).into());
    }
    let configs = corpus::config_grid(windows, lookaheads, grid.min_match, grid.search);
    log::info!("benchmarking {} configurations with {} search", configs.len(), grid.search.name());

    let start = Instant::now();
    let results = corpus::run(&files, &configs, threads)?;
    let elapsed = start.elapsed();

    for result in &results {
        eprintln!(
            "{} (window {}, lookahead {}):",
            result.name(),
            result.config.window_size,
            result.config.lookahead_size
        );
        for line in result.stats.to_string().lines() {
            eprintln!("  {}", line);
        }
    }
    eprintln!("{} runs over {} files in {:.2?}", results.len(), files.len(), elapsed);

    if let Some(path) = csv {
        corpus::write_csv(&results, BufWriter::new(File::create(path)?))?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
