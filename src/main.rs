use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tagscope::{ProbeResult, Prober, ScanLimits, Summary};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Extensions picked up when scanning a directory
const SUPPORTED_EXTENSIONS: [&str; 4] = ["mp3", "flac", "m4a", "mp4"];

#[derive(Parser, Debug)]
#[command(name = "tagscope")]
#[command(author, version, about = "Show tags and MP3 encoder settings for audio files")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// File or directory to scan
    path: Option<PathBuf>,

    /// Output report file (.csv, .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// How far into a file to look for an ID3v2 tag
    #[arg(long, default_value_t = 10_000)]
    id3_scan_limit: usize,

    /// How many bytes after the ID3v2 tag to search for an encoder header
    #[arg(long, default_value_t = 10_000)]
    window: usize,

    /// Include artists in suggested filenames
    #[arg(long)]
    artist_in_name: bool,

    /// Show header details and debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the decoded Xing/LAME header of an MP3 file as JSON
    Header {
        /// MP3 file to inspect
        path: PathBuf,
    },

    /// Print the tags and stream info of a file as JSON
    Tags {
        /// Audio file to inspect
        path: PathBuf,
    },
}

impl Args {
    fn limits(&self) -> ScanLimits {
        ScanLimits {
            id3_scan_limit: self.id3_scan_limit,
            post_tag_window: self.window,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tagscope=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(cmd) = &args.command {
        let code = match cmd {
            Command::Header { path } => print_header(path, &args.limits()),
            Command::Tags { path } => print_tags(path, &args.limits()),
        };
        std::process::exit(code);
    }

    let Some(path) = args.path.clone() else {
        eprintln!("Usage: tagscope <PATH>");
        eprintln!("Run 'tagscope --help' for more options.");
        std::process::exit(1);
    };

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files = collect_files(&path);
    if files.is_empty() {
        eprintln!(
            "No audio files found (supported: {})",
            SUPPORTED_EXTENSIONS.join(", ")
        );
        std::process::exit(1);
    }

    if !args.quiet {
        eprintln!("\x1b[1mtagscope\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} audio file(s)\n", files.len());
    }

    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let prober = Prober::new()
        .with_limits(args.limits())
        .with_artist_in_name(args.artist_in_name);

    let results: Vec<ProbeResult> = files
        .par_iter()
        .map(|path| {
            let result = prober.probe(path);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(result.file_name.clone());
            }
            result
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if !args.quiet {
        for r in &results {
            print_result(r, args.verbose);
        }
    }

    let summary = Summary::from_results(&results);
    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  MP3:         {}", summary.mp3);
        eprintln!("  FLAC:        {}", summary.flac);
        eprintln!("  MP4:         {}", summary.mp4);
        eprintln!("  \x1b[33mIncomplete:\x1b[0m  {}", summary.incomplete);
        if summary.error > 0 {
            eprintln!("  \x1b[31mErrors:\x1b[0m      {}", summary.error);
        }
    }

    if let Some(ref output_path) = args.output {
        if let Err(e) = tagscope::report::generate(output_path, &results) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }
    }

    if summary.error > 0 {
        std::process::exit(1);
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn collect_files(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_supported_extension(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

fn print_result(r: &ProbeResult, verbose: bool) {
    if let Some(ref error) = r.error {
        println!("\x1b[31m{:<16}\x1b[0m {}  ({})", "[ERROR]", r.file_name, error);
        return;
    }

    let codec = r.codec.as_deref().unwrap_or("-");
    let color = if r.complete { "\x1b[32m" } else { "\x1b[33m" };
    println!(
        "{}{:<16}\x1b[0m {:>4}kbps  {:>7.1}s  {}",
        color,
        truncate(codec, 16),
        r.bitrate / 1000,
        r.length_seconds,
        r.file_name
    );

    if verbose {
        if let Some(kind) = r.header_kind {
            eprintln!(
                "    Header: {} lame={}",
                kind,
                r.lame_version.as_deref().unwrap_or("n/a")
            );
        }
        if let Some(ref name) = r.suggested_name {
            eprintln!("    Suggested name: {}", name);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            1
        }
    }
}

fn print_header(path: &Path, limits: &ScanLimits) -> i32 {
    match tagscope::read_xing_file(path, limits) {
        Ok(header) => print_json(&header),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn print_tags(path: &Path, limits: &ScanLimits) -> i32 {
    match tagscope::read_tags_with(path, limits) {
        Ok(track) => print_json(&track),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
