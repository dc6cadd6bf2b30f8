//! Interactive/batch front end for `khmer-core`, grounded on the
//! stdin-loop shape of `libpinyin/src/main.rs` and the `clap::Parser`
//! command shape of `tools/src/main.rs`.

use anyhow::{Context, Result};
use clap::Parser;
use khmer_core::{Config, Dictionary, Segmenter};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "khmer-cli")]
enum Cli {
    /// Segment lines of Khmer text read from stdin (or --input) and write
    /// one segmented line per input line to stdout.
    Segment {
        #[arg(long)]
        dict: PathBuf,

        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, default_value = "\u{200B}")]
        separator: String,

        #[arg(long)]
        no_normalize: bool,

        #[arg(long)]
        no_repair: bool,

        #[arg(long)]
        no_acronym: bool,

        #[arg(long)]
        no_unknown_merge: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse() {
        Cli::Segment {
            dict,
            input,
            separator,
            no_normalize,
            no_repair,
            no_acronym,
            no_unknown_merge,
        } => run_segment(&dict, input.as_deref(), &separator, no_normalize, no_repair, no_acronym, no_unknown_merge),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_segment(
    dict_path: &std::path::Path,
    input_path: Option<&std::path::Path>,
    separator: &str,
    no_normalize: bool,
    no_repair: bool,
    no_acronym: bool,
    no_unknown_merge: bool,
) -> Result<()> {
    let dictionary = Dictionary::open(dict_path)
        .with_context(|| format!("failed to load dictionary from {}", dict_path.display()))?;
    tracing::info!(path = %dict_path.display(), entries = dictionary.num_entries(), "dictionary loaded");

    let mut config = Config::default();
    config.enable_normalization = !no_normalize;
    config.enable_repair_mode = !no_repair;
    config.enable_acronym_detection = !no_acronym;
    config.enable_unknown_merging = !no_unknown_merge;

    // Constructed once, shared across every line: the "construct once,
    // call many times" lifecycle of spec §3/§5.
    let segmenter = Segmenter::new(Arc::new(dictionary), config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let lines: Box<dyn Iterator<Item = io::Result<String>>> = match input_path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open input file {}", path.display()))?;
            Box::new(io::BufReader::new(file).lines())
        }
        None => Box::new(io::stdin().lock().lines()),
    };

    let mut processed = 0u64;
    for line in lines {
        let line = line.context("failed to read input line")?;
        let segmented = segmenter.segment_bytes(line.as_bytes(), separator.as_bytes());
        out.write_all(&segmented)?;
        out.write_all(b"\n")?;
        processed += 1;
    }
    tracing::info!(lines = processed, "segmentation complete");

    Ok(())
}
